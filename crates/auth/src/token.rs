//! Stateless session tokens (HS256 JWT).
//!
//! Tokens are never stored server-side: a token is valid iff its signature
//! verifies under the current secret and `now < exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use thiserror::Error;

use ledgerly_core::UserId;

use crate::claims::{AuthError, SessionClaims, validate_claims};

/// Session lifetime, in seconds, used when none is configured.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Verifies a presented bearer token at a given instant.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenIssueError {
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// HS256 token issuer + validator sharing one server-held secret.
#[derive(Clone)]
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256SessionTokens {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let secret = secret.as_ref();

        // Expiry is checked by `validate_claims` against the caller's clock,
        // not by jsonwebtoken against the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a signed token for `user_id`, valid from `now` for the configured ttl.
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenIssueError> {
        let claims = SessionClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenIssueError::Signing(e.to_string()))
    }

    /// Check the signature over `header.payload` before anything inside the
    /// token is parsed, so a tampered token is always reported as such.
    fn verify_signature(&self, token: &str) -> Result<(), AuthError> {
        let mut parts = token.rsplitn(2, '.');
        let (Some(signature), Some(message)) = (parts.next(), parts.next()) else {
            return Err(AuthError::Malformed("expected header.payload.signature".to_string()));
        };
        if message.matches('.').count() != 1 {
            return Err(AuthError::Malformed("expected header.payload.signature".to_string()));
        }

        match jsonwebtoken::crypto::verify(
            signature,
            message.as_bytes(),
            &self.decoding,
            Algorithm::HS256,
        ) {
            Ok(true) => Ok(()),
            // An undecodable signature segment is still a signature that does not verify.
            Ok(false) | Err(_) => Err(AuthError::BadSignature),
        }
    }
}

impl JwtValidator for Hs256SessionTokens {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        self.verify_signature(token)?;

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                other => AuthError::Malformed(format!("{other:?}")),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for Hs256SessionTokens {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256SessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn ttl() -> Duration {
        Duration::seconds(DEFAULT_TOKEN_TTL_SECS)
    }

    fn tokens() -> Hs256SessionTokens {
        Hs256SessionTokens::new("test-secret", ttl())
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let svc = tokens();
        let token = svc.issue(UserId::new(42), "alice", t0()).unwrap();

        let claims = svc.validate(&token, t0()).unwrap();
        assert_eq!(claims.sub, UserId::new(42));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, ttl());
    }

    #[test]
    fn subject_claim_is_a_string_on_the_wire() {
        let token = tokens().issue(UserId::new(42), "alice", t0()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);
        let raw = jsonwebtoken::decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(raw.claims["sub"], "42");
    }

    #[test]
    fn expires_after_ttl() {
        let svc = tokens();
        let token = svc.issue(UserId::new(1), "alice", t0()).unwrap();

        let just_before = t0() + ttl() - Duration::seconds(1);
        assert!(svc.validate(&token, just_before).is_ok());
        assert_eq!(
            svc.validate(&token, t0() + ttl()),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn other_secret_is_bad_signature() {
        let token = tokens().issue(UserId::new(1), "alice", t0()).unwrap();
        let other = Hs256SessionTokens::new("another-secret", ttl());
        assert_eq!(other.validate(&token, t0()), Err(AuthError::BadSignature));
    }

    #[test]
    fn any_single_bit_flip_is_rejected() {
        let svc = tokens();
        let token = svc.issue(UserId::new(7), "bob", t0()).unwrap();
        let bytes = token.as_bytes();

        for pos in 0..bytes.len() {
            if bytes[pos] == b'.' {
                continue;
            }
            for bit in 0..7 {
                let mut tampered = bytes.to_vec();
                tampered[pos] ^= 1 << bit;
                if tampered[pos] == b'.' {
                    // Changes the segment count rather than the content.
                    let tampered = String::from_utf8(tampered).unwrap();
                    assert!(svc.validate(&tampered, t0()).is_err());
                    continue;
                }
                let tampered = String::from_utf8(tampered).unwrap();
                assert_eq!(
                    svc.validate(&tampered, t0()),
                    Err(AuthError::BadSignature),
                    "flip of bit {bit} at byte {pos} was not caught"
                );
            }
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = tokens();
        for junk in ["", "abc", "a.b", "a.b.c.d"] {
            assert_eq!(svc.validate(junk, t0()).unwrap_err().reason(), "malformed", "{junk}");
        }
    }

    #[test]
    fn signed_garbage_payload_is_malformed() {
        // Correctly signed, but the payload is not a claims object.
        let svc = tokens();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "hello": "world" }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(svc.validate(&token, t0()).unwrap_err().reason(), "malformed");
    }
}
