use serde::{Deserialize, Serialize};

use ledgerly_core::UserId;

use crate::SessionClaims;

/// Identity of an authenticated caller, resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}
