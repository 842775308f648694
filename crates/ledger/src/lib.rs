//! Ledger module (income/expense records and their aggregation).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod summary;
pub mod transaction;

pub use summary::{Summary, summarize, totals_by_kind};
pub use transaction::{
    AmountInput, MAX_AMOUNT, MAX_AMOUNT_SCALE, MAX_CATEGORY_LEN, NewTransaction, Transaction,
    TransactionInput, TransactionKind,
};
