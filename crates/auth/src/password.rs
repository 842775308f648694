//! One-way, salted password hashing (argon2id).
//!
//! Hash records are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the cost parameters travel with each record and old records keep
//! verifying after the defaults change.

use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Password hash/verify primitive.
///
/// Hashing is CPU- and memory-bound; async callers should run it on a
/// blocking worker (`tokio::task::spawn_blocking`).
#[derive(Debug)]
pub struct PasswordHasher {
    params: Params,
    dummy: OnceLock<Option<String>>,
}

impl PasswordHasher {
    /// Hasher with explicit argon2 cost parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            dummy: OnceLock::new(),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Verify a plaintext password against a stored hash record.
    ///
    /// Never fails: a malformed record is a mismatch.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend one verification against a throwaway record.
    ///
    /// Used when the username is unknown so that login latency does not reveal
    /// whether an account exists. Always returns `false`.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let dummy = self
            .dummy
            .get_or_init(|| self.hash("ledgerly-dummy-password").ok());
        if let Some(dummy) = dummy {
            let _ = self.verify(plaintext, dummy);
        }
        false
    }
}

impl Default for PasswordHasher {
    /// argon2id with the crate's recommended parameters (19 MiB, 2 passes),
    /// which verifies in tens of milliseconds on commodity hardware.
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap();
        let record = hasher.hash("hunter2").unwrap();
        assert!(record.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &record));
        assert!(!hasher.verify("hunter3", &record));
    }

    #[test]
    fn fresh_salt_per_call() {
        let hasher = cheap();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same", &a));
        assert!(hasher.verify("same", &b));
    }

    #[test]
    fn malformed_record_is_a_mismatch() {
        let hasher = cheap();
        assert!(!hasher.verify("anything", ""));
        assert!(!hasher.verify("anything", "not-a-phc-string"));
        assert!(!hasher.verify("anything", "$2b$10$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn records_from_other_params_still_verify() {
        let record = cheap().hash("pw").unwrap();
        let other = PasswordHasher::new(Params::new(2048, 2, 1, None).unwrap());
        assert!(other.verify("pw", &record));
    }

    #[test]
    fn dummy_never_accepts() {
        assert!(!cheap().verify_dummy("ledgerly-dummy-password"));
    }
}
