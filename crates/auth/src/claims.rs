use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerly_core::UserId;

/// Session token claims (transport-agnostic).
///
/// Timestamps are encoded as seconds since the epoch, which is what `iat` and
/// `exp` mean in a JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated user's id. A string on the wire, as the
    /// registered `sub` claim requires.
    #[serde(with = "subject")]
    pub sub: UserId,

    /// Username at the time of login.
    pub username: String,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

mod subject {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use ledgerly_core::UserId;

    pub fn serialize<S: Serializer>(id: &UserId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UserId, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

/// Why a presented token was not accepted.
///
/// All variants are "unauthenticated" to the outside world; the distinction
/// exists for logs and tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

impl AuthError {
    /// Short reason tag for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Malformed(_) => "malformed",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
        }
    }
}

/// Deterministically validate session claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`] before claims are ever looked at.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
    if claims.exp <= claims.iat {
        return Err(AuthError::Malformed(
            "invalid time window (exp <= iat)".to_string(),
        ));
    }
    if now < claims.iat {
        return Err(AuthError::Malformed("token issued in the future".to_string()));
    }
    if now >= claims.exp {
        return Err(AuthError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims_at(iat: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims {
            sub: UserId::new(1),
            username: "alice".to_string(),
            iat,
            exp: iat + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));
        assert_eq!(validate_claims(&claims, t0), Ok(()));
        assert_eq!(validate_claims(&claims, t0 + Duration::minutes(59)), Ok(()));
    }

    #[test]
    fn expired_at_and_after_exp() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::hours(1));
        assert_eq!(validate_claims(&claims, claims.exp), Err(AuthError::Expired));
        assert_eq!(
            validate_claims(&claims, t0 + Duration::days(2)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn inverted_window_is_malformed() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = claims_at(t0, Duration::zero());
        assert_eq!(validate_claims(&claims, t0).unwrap_err().reason(), "malformed");
    }

    #[test]
    fn timestamps_serialize_as_epoch_seconds() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_value(claims_at(t0, Duration::hours(1))).unwrap();
        assert_eq!(json["iat"], 1_704_067_200);
        assert_eq!(json["exp"], 1_704_070_800);
        assert_eq!(json["sub"], "1");
    }

    #[test]
    fn subject_round_trips_as_string() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut claims = claims_at(t0, Duration::hours(1));
        claims.sub = UserId::new(42);

        let json = serde_json::to_value(&claims).unwrap();
        let back: SessionClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back.sub, UserId::new(42));
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let json = serde_json::json!({
            "sub": "alice",
            "username": "alice",
            "iat": 1_704_067_200,
            "exp": 1_704_070_800,
        });
        assert!(serde_json::from_value::<SessionClaims>(json).is_err());
    }
}
