//! Income/expense aggregation.
//!
//! Totals are exact decimal sums. A store that aggregates on its own side
//! (`SELECT type, SUM(amount) ... GROUP BY type`) hands its grouped rows to
//! [`Summary::from_totals`]; an in-process caller hands the records to
//! [`summarize`]. Both go through the same fold, so they cannot disagree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionKind};

/// Ledger totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
}

impl Summary {
    /// Build a summary from per-kind subtotals.
    ///
    /// A kind may appear any number of times (its subtotals are added) or not
    /// at all (it counts as zero).
    pub fn from_totals(totals: impl IntoIterator<Item = (TransactionKind, Decimal)>) -> Self {
        let (total_income, total_expenses) = totals.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), (kind, amount)| match kind {
                TransactionKind::Income => (income + amount, expenses),
                TransactionKind::Expense => (income, expenses + amount),
            },
        );

        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

/// Summarize records in-process.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a Transaction>) -> Summary {
    Summary::from_totals(records.into_iter().map(|t| (t.kind, t.amount)))
}

/// Group records by kind and sum each group, like a `GROUP BY type` query.
///
/// Kinds with no records are absent from the result.
pub fn totals_by_kind<'a>(
    records: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<(TransactionKind, Decimal)> {
    let mut groups: BTreeMap<TransactionKind, Decimal> = BTreeMap::new();
    for t in records {
        *groups.entry(t.kind).or_insert(Decimal::ZERO) += t.amount;
    }
    groups.into_iter().collect()
}
