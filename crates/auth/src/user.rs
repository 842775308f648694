//! Registered users (credential records).
//!
//! A user is created once at registration and never changes afterwards.

use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, Entity, UserId};

/// Longest accepted username (characters).
pub const MAX_USERNAME_LEN: usize = 50;

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// PHC-format hash record; opaque to everything except [`crate::PasswordHasher`].
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A credential record that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    password_hash: String,
}

impl NewUser {
    /// Check the store-boundary rules: both fields non-empty, username within
    /// [`MAX_USERNAME_LEN`].
    pub fn new(username: &str, password_hash: &str) -> DomainResult<Self> {
        let mut missing = Vec::new();
        if username.trim().is_empty() {
            missing.push("username");
        }
        if password_hash.is_empty() {
            missing.push("password_hash");
        }
        if !missing.is_empty() {
            return Err(DomainError::missing(missing));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::malformed(
                "username",
                format!("must be at most {MAX_USERNAME_LEN} characters"),
            ));
        }

        Ok(Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}
