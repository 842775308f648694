//! In-memory stores.
//!
//! Intended for tests/dev. Each store keeps its whole state behind one
//! `RwLock`; every check-and-write happens under a single write guard, which
//! gives the same atomicity a unique constraint gives in Postgres.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use ledgerly_auth::{NewUser, User};
use ledgerly_core::{Entity, TransactionId, UserId};
use ledgerly_ledger::{NewTransaction, Transaction, TransactionKind, totals_by_kind};

use super::{CredentialStore, LedgerStore, ListOrder, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct Users {
    last_id: i64,
    by_username: HashMap<String, User>,
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<Users>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError> {
        let new_user = NewUser::new(username, password_hash)?;

        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.by_username.contains_key(new_user.username()) {
            return Err(StoreError::Conflict("username already exists".to_string()));
        }

        users.last_id += 1;
        let id = UserId::new(users.last_id);
        let user = new_user.into_user(id);
        users.by_username.insert(user.username.clone(), user);
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.by_username.get(username).cloned())
    }
}

#[derive(Debug, Default)]
struct Rows {
    last_id: i64,
    by_id: BTreeMap<TransactionId, Transaction>,
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    rows: RwLock<Rows>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_records(records: &mut [Transaction], order: ListOrder) {
    match order {
        ListOrder::Id => records.sort_by_key(|t| t.id()),
        ListOrder::Date => records.sort_by_key(|t| (t.date, t.id())),
        ListOrder::Amount => records.sort_by_key(|t| (t.amount, t.id())),
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create(&self, record: NewTransaction) -> Result<TransactionId, StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        rows.last_id += 1;
        let record = record.into_transaction(TransactionId::new(rows.last_id));
        let id = record.id();
        rows.by_id.insert(id, record);
        Ok(id)
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.by_id.get(&id).cloned())
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<Transaction>, StoreError> {
        let mut records: Vec<Transaction> = {
            let rows = self.rows.read().map_err(|_| poisoned())?;
            rows.by_id.values().cloned().collect()
        };
        sort_records(&mut records, order);
        Ok(records)
    }

    async fn update(&self, id: TransactionId, record: NewTransaction) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        match rows.by_id.get_mut(&id) {
            Some(existing) => {
                *existing = record.into_transaction(id);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: TransactionId) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        rows.by_id.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn totals_by_kind(&self) -> Result<Vec<(TransactionKind, Decimal)>, StoreError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(totals_by_kind(rows.by_id.values()))
    }
}
