//! Credential and ledger persistence.
//!
//! Two backends implement the same traits: in-memory (tests/dev) and Postgres
//! (production). Callers hold them as `Arc<dyn ...>` and never know which one
//! they got.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use ledgerly_auth::User;
use ledgerly_core::{DomainError, TransactionId, UserId, ValidationError};
use ledgerly_ledger::{NewTransaction, Summary, Transaction, TransactionKind};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCredentialStore, InMemoryLedgerStore};
pub use postgres::{PostgresCredentialStore, PostgresLedgerStore};

/// Store operation error.
///
/// `Unavailable` and `Backend` are infrastructure failures; everything else is
/// something the caller can act on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Backend(String),
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(v) => StoreError::Validation(v),
            DomainError::NotFound => StoreError::NotFound,
            DomainError::Conflict(msg) => StoreError::Conflict(msg),
        }
    }
}

/// Requested order for [`LedgerStore::list`]. Ties always break on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Id,
    Date,
    Amount,
}

/// Username → password-hash records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Uniqueness is decided atomically with the insert; a
    /// taken username is `StoreError::Conflict`.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
}

/// Transaction records.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create(&self, record: NewTransaction) -> Result<TransactionId, StoreError>;

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Re-reads current state on every call.
    async fn list(&self, order: ListOrder) -> Result<Vec<Transaction>, StoreError>;

    /// Full-record replace; `StoreError::NotFound` if `id` is absent.
    async fn update(&self, id: TransactionId, record: NewTransaction) -> Result<(), StoreError>;

    /// `StoreError::NotFound` if `id` is absent.
    async fn delete(&self, id: TransactionId) -> Result<(), StoreError>;

    /// Per-kind sums, computed on the store's side. Kinds without records may
    /// be omitted.
    async fn totals_by_kind(&self) -> Result<Vec<(TransactionKind, Decimal)>, StoreError>;

    async fn summary(&self) -> Result<Summary, StoreError> {
        Ok(Summary::from_totals(self.totals_by_kind().await?))
    }
}
