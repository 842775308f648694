use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;

use ledgerly_auth::{Hs256SessionTokens, JwtValidator, PasswordHasher};
use ledgerly_core::UserId;
use ledgerly_infra::{
    Config, CredentialStore, InMemoryCredentialStore, InMemoryLedgerStore, LedgerStore,
    PostgresCredentialStore, PostgresLedgerStore, StoreError, db,
};

use crate::app::errors::ApiError;

/// Process-scoped state shared by every handler.
///
/// Built once before the server starts and drained by [`AppServices::shutdown`]
/// after it stops.
pub struct AppServices {
    credentials: Arc<dyn CredentialStore>,
    ledger: Arc<dyn LedgerStore>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<Hs256SessionTokens>,
    pool: Option<PgPool>,
}

impl AppServices {
    /// Services over in-memory stores (tests/dev).
    pub fn in_memory(config: &Config) -> Self {
        Self {
            credentials: Arc::new(InMemoryCredentialStore::new()),
            ledger: Arc::new(InMemoryLedgerStore::new()),
            hasher: Arc::new(PasswordHasher::default()),
            tokens: Arc::new(Hs256SessionTokens::new(&config.jwt_secret, config.token_ttl)),
            pool: None,
        }
    }

    /// Postgres-backed services when `DATABASE_URL` is set, in-memory otherwise.
    ///
    /// Connects the pool and creates the schema before returning.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            return Ok(Self::in_memory(config));
        };

        let pool = db::connect(url, config.database_max_connections).await?;
        db::ensure_schema(&pool).await?;

        Ok(Self {
            credentials: Arc::new(PostgresCredentialStore::new(pool.clone())),
            ledger: Arc::new(PostgresLedgerStore::new(pool.clone())),
            hasher: Arc::new(PasswordHasher::default()),
            tokens: Arc::new(Hs256SessionTokens::new(&config.jwt_secret, config.token_ttl)),
            pool: Some(pool),
        })
    }

    /// Replace the password hasher (tests use cheap argon2 parameters).
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn token_validator(&self) -> Arc<dyn JwtValidator> {
        self.tokens.clone()
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    /// Hash the password off the async workers and insert the user.
    ///
    /// Username rules are enforced by the store when it builds the record.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, ApiError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let id = self.credentials.create_user(username, &hash).await?;
        tracing::info!(user_id = %id, "user registered");
        Ok(id)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown users still cost one hash verification, and both failure modes
    /// produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let user = self.credentials.find_by_username(username).await?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(stored) => hasher.verify(&password, &stored),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::debug!("login rejected");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let token = self
            .tokens
            .issue(user.id, &user.username, Utc::now())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        tracing::info!(user_id = %user.id, "session issued");
        Ok(token)
    }

    /// Close the pool (if any), waiting for checked-out connections to return.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}

impl core::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppServices")
            .field("tokens", &self.tokens)
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}
