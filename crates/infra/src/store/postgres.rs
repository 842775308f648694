//! Postgres-backed stores.
//!
//! ## Connection handling
//!
//! Every operation runs directly against the `PgPool`: sqlx checks a
//! connection out for the single statement and returns it to the pool when
//! the query future completes or is dropped, on success and error paths alike.
//! No method holds a connection across an `.await` of anything else.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Backend` |

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use ledgerly_auth::{NewUser, User};
use ledgerly_core::{TransactionId, UserId};
use ledgerly_ledger::{NewTransaction, Transaction, TransactionKind};

use super::{CredentialStore, LedgerStore, ListOrder, StoreError};

/// Credential store over the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self, password_hash), err)]
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError> {
        let new_user = NewUser::new(username, password_hash)?;

        // The UNIQUE constraint decides; there is no prior existence check.
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(new_user.username())
        .bind(new_user.password_hash())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("create_user", e))?;
        Ok(UserId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_username", e))?;

        row.map(|r| -> Result<User, sqlx::Error> {
            Ok(User {
                id: UserId::new(r.try_get("id")?),
                username: r.try_get("username")?,
                password_hash: r.try_get("password_hash")?,
            })
        })
        .transpose()
        .map_err(|e: sqlx::Error| map_sqlx_error("find_by_username", e))
    }
}

/// Ledger store over the `transactions` table.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_kind(raw: &str) -> Result<TransactionKind, StoreError> {
    raw.parse::<TransactionKind>()
        .map_err(|_| StoreError::Backend(format!("unknown transaction type '{raw}' in store")))
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
    let decode = |e| map_sqlx_error("decode_transaction", e);

    let kind: String = row.try_get("type").map_err(decode)?;
    Ok(Transaction {
        id: TransactionId::new(row.try_get("id").map_err(decode)?),
        kind: parse_kind(&kind)?,
        category: row.try_get("category").map_err(decode)?,
        amount: row.try_get::<Decimal, _>("amount").map_err(decode)?,
        date: row.try_get::<NaiveDate, _>("date").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
    })
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, record), fields(kind = %record.kind), err)]
    async fn create(&self, record: NewTransaction) -> Result<TransactionId, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (type, category, amount, date, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(record.kind.as_str())
        .bind(&record.category)
        .bind(record.amount)
        .bind(record.date)
        .bind(&record.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_transaction", e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("create_transaction", e))?;
        Ok(TransactionId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, type, category, amount, date, description
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_transaction", e))?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, order: ListOrder) -> Result<Vec<Transaction>, StoreError> {
        let order_by = match order {
            ListOrder::Id => "id ASC",
            ListOrder::Date => "date ASC, id ASC",
            ListOrder::Amount => "amount ASC, id ASC",
        };
        let sql = format!(
            "SELECT id, type, category, amount, date, description \
             FROM transactions ORDER BY {order_by}"
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_transactions", e))?;

        rows.iter().map(transaction_from_row).collect()
    }

    #[instrument(skip(self, record), err)]
    async fn update(&self, id: TransactionId, record: NewTransaction) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET type = $1, category = $2, amount = $3, date = $4, description = $5
            WHERE id = $6
            "#,
        )
        .bind(record.kind.as_str())
        .bind(&record.category)
        .bind(record.amount)
        .bind(record.date)
        .bind(&record.description)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_transaction", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: TransactionId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_transaction", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn totals_by_kind(&self) -> Result<Vec<(TransactionKind, Decimal)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT type, SUM(amount) AS total
            FROM transactions
            GROUP BY type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("totals_by_kind", e))?;

        rows.iter()
            .map(|row| {
                let kind: String = row
                    .try_get("type")
                    .map_err(|e| map_sqlx_error("totals_by_kind", e))?;
                let total: Decimal = row
                    .try_get("total")
                    .map_err(|e| map_sqlx_error("totals_by_kind", e))?;
                Ok((parse_kind(&kind)?, total))
            })
            .collect()
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_unavailable() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn unexpected_row_shape_is_backend() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn unknown_kind_in_store_is_backend() {
        assert!(matches!(parse_kind("transfer"), Err(StoreError::Backend(_))));
        assert_eq!(parse_kind("income"), Ok(TransactionKind::Income));
    }
}
