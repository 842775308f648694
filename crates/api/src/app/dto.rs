use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, TransactionId, UserId};
use ledgerly_infra::ListOrder;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /register` and `POST /login`.
///
/// Fields are optional so that a missing field is a validation error listing
/// every absent field, not a JSON shape rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, or a `MissingFields` error naming the absent ones.
    pub fn require(self) -> DomainResult<(String, String)> {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        if !present(&self.username) {
            missing.push("username");
        }
        if !present(&self.password) {
            missing.push("password");
        }

        match (self.username, self.password) {
            (Some(username), Some(password)) if missing.is_empty() => Ok((username, password)),
            _ => Err(DomainError::missing(missing)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<ListOrder>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct CreatedTransaction {
    pub id: TransactionId,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Ready to paste into an `Authorization` header: `"Bearer <jwt>"`.
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub id: UserId,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::ValidationError;

    fn req(json: serde_json::Value) -> CredentialsRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn all_missing_fields_are_listed() {
        assert_eq!(
            req(serde_json::json!({})).require(),
            Err(DomainError::Validation(ValidationError::MissingFields(vec![
                "username", "password"
            ])))
        );
        assert_eq!(
            req(serde_json::json!({ "username": "alice", "password": "  " })).require(),
            Err(DomainError::missing(["password"]))
        );
    }

    #[test]
    fn complete_credentials_pass_through() {
        let (u, p) = req(serde_json::json!({ "username": "alice", "password": "pw" }))
            .require()
            .unwrap();
        assert_eq!((u.as_str(), p.as_str()), ("alice", "pw"));
    }
}
