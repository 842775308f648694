//! Infrastructure layer: configuration, Postgres wiring, stores.

pub mod config;
pub mod db;
pub mod store;

pub use config::{Config, ConfigError};
pub use store::{
    CredentialStore, InMemoryCredentialStore, InMemoryLedgerStore, LedgerStore, ListOrder,
    PostgresCredentialStore, PostgresLedgerStore, StoreError,
};
