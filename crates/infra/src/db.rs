//! Database adapters: connection pool and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use crate::store::{StoreError, postgres::map_sqlx_error};

const SCHEMA: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            BIGSERIAL PRIMARY KEY,
            username      VARCHAR(50) UNIQUE NOT NULL,
            password_hash VARCHAR(255) NOT NULL
        )
        "#,
    ),
    (
        "transactions",
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id          BIGSERIAL PRIMARY KEY,
            type        VARCHAR(10) NOT NULL CHECK (type IN ('income', 'expense')),
            category    VARCHAR(50) NOT NULL,
            amount      NUMERIC NOT NULL CHECK (amount > 0),
            date        DATE NOT NULL,
            description TEXT
        )
        "#,
    ),
];

/// Open the process-wide connection pool.
#[instrument(skip(database_url), err)]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the tables if they do not exist yet. Safe to run on every start.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for (table, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        tracing::debug!(table, "table created or already exists");
    }
    tracing::info!("schema ready");
    Ok(())
}
