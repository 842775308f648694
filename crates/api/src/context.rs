use ledgerly_auth::{Principal, SessionClaims};
use ledgerly_core::UserId;

/// Principal context for a request (identity resolved from the bearer token).
///
/// Inserted into request extensions by the auth middleware; handlers behind
/// the gate can rely on it being present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn username(&self) -> &str {
        &self.principal.username
    }
}

impl From<SessionClaims> for PrincipalContext {
    fn from(claims: SessionClaims) -> Self {
        Self::new(Principal::from(claims))
    }
}
