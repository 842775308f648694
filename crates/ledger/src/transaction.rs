use core::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, Entity, TransactionId};

/// Longest accepted category name (characters).
pub const MAX_CATEGORY_LEN: usize = 50;

/// Largest accepted amount.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0); // 1e15

/// Most decimal places an amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 4;

/// Which side of the ledger a record sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(DomainError::malformed("type", "must be one of: income, expense")),
        }
    }
}

/// A stored ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A validated record without an id: the payload of create and of a
/// full-replace update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            date: self.date,
            description: self.description,
        }
    }
}

/// Amount as a client sends it: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    fn is_blank(&self) -> bool {
        matches!(self, AmountInput::Text(s) if s.trim().is_empty())
    }

    fn parse(&self) -> DomainResult<Decimal> {
        // Numbers go through their shortest decimal rendering, never through
        // f64 arithmetic.
        let text = match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.trim().to_string(),
        };

        let amount = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| {
                DomainError::malformed("amount", format!("'{text}' is not a decimal number"))
            })?;

        if amount <= Decimal::ZERO {
            return Err(DomainError::malformed("amount", "must be greater than zero"));
        }
        if amount > MAX_AMOUNT {
            return Err(DomainError::malformed("amount", format!("must not exceed {MAX_AMOUNT}")));
        }
        if amount.normalize().scale() > MAX_AMOUNT_SCALE {
            return Err(DomainError::malformed(
                "amount",
                format!("at most {MAX_AMOUNT_SCALE} decimal places"),
            ));
        }
        Ok(amount)
    }
}

/// Raw, unvalidated transaction body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<AmountInput>,
    pub date: Option<String>,
    pub description: Option<String>,
}

fn blank(s: &Option<String>) -> bool {
    s.as_deref().map(str::trim).is_none_or(str::is_empty)
}

impl TransactionInput {
    /// Validate into a [`NewTransaction`].
    ///
    /// All missing required fields are reported together; format problems are
    /// only looked at once every required field is present.
    pub fn validate(self) -> DomainResult<NewTransaction> {
        let mut missing = Vec::new();
        if blank(&self.kind) {
            missing.push("type");
        }
        if blank(&self.category) {
            missing.push("category");
        }
        if self.amount.as_ref().is_none_or(AmountInput::is_blank) {
            missing.push("amount");
        }
        if blank(&self.date) {
            missing.push("date");
        }
        if !missing.is_empty() {
            return Err(DomainError::missing(missing));
        }

        let (Some(kind), Some(category), Some(amount), Some(date)) =
            (self.kind, self.category, self.amount, self.date)
        else {
            return Err(DomainError::missing(["type", "category", "amount", "date"]));
        };

        let kind = kind.parse::<TransactionKind>()?;

        let category = category.trim().to_string();
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(DomainError::malformed(
                "category",
                format!("must be at most {MAX_CATEGORY_LEN} characters"),
            ));
        }

        let amount = amount.parse()?;

        let date = date.trim();
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            DomainError::malformed("date", format!("'{date}' is not a YYYY-MM-DD date"))
        })?;

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(NewTransaction {
            kind,
            category,
            amount,
            date,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::ValidationError;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(json: serde_json::Value) -> TransactionInput {
        serde_json::from_value(json).unwrap()
    }

    fn validation_err(json: serde_json::Value) -> ValidationError {
        match input(json).validate() {
            Err(DomainError::Validation(v)) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn max_amount_constant_is_one_quadrillion() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));
    }

    #[test]
    fn accepts_complete_record() {
        let tx = input(serde_json::json!({
            "type": "income",
            "category": "salary",
            "amount": "1000.00",
            "date": "2024-01-01",
            "description": "January"
        }))
        .validate()
        .unwrap();

        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.category, "salary");
        assert_eq!(tx.amount, d("1000.00"));
        assert_eq!(tx.amount.to_string(), "1000.00");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(tx.description.as_deref(), Some("January"));
    }

    #[test]
    fn numeric_amount_is_exact() {
        let tx = input(serde_json::json!({
            "type": "Expense", "category": "coffee", "amount": 12.34, "date": "2024-02-29"
        }))
        .validate()
        .unwrap();
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, d("12.34"));
        assert_eq!(tx.description, None);
    }

    #[test]
    fn reports_every_missing_field() {
        assert_eq!(
            validation_err(serde_json::json!({ "category": "  " })),
            ValidationError::MissingFields(vec!["type", "category", "amount", "date"])
        );
        assert_eq!(
            validation_err(serde_json::json!({
                "type": "income", "category": "salary", "amount": ""
            })),
            ValidationError::MissingFields(vec!["amount", "date"])
        );
    }

    #[test]
    fn format_errors_are_distinct_from_missing() {
        let base = |amount: serde_json::Value, date: &str| {
            serde_json::json!({ "type": "income", "category": "x", "amount": amount, "date": date })
        };

        for (amount, date, field) in [
            (serde_json::json!("abc"), "2024-01-01", "amount"),
            (serde_json::json!(0), "2024-01-01", "amount"),
            (serde_json::json!("-5"), "2024-01-01", "amount"),
            (serde_json::json!("0.00001"), "2024-01-01", "amount"),
            (serde_json::json!("10000000000000000"), "2024-01-01", "amount"),
            (serde_json::json!(5), "01/02/2024", "date"),
            (serde_json::json!(5), "2024-02-30", "date"),
        ] {
            match validation_err(base(amount.clone(), date)) {
                ValidationError::Malformed { field: f, .. } => {
                    assert_eq!(f, field, "{amount} {date}")
                }
                other => panic!("expected malformed {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn trailing_zeros_do_not_count_against_scale() {
        let tx = input(serde_json::json!({
            "type": "income", "category": "x", "amount": "1.500000", "date": "2024-01-01"
        }))
        .validate()
        .unwrap();
        assert_eq!(tx.amount, d("1.5"));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = validation_err(serde_json::json!({
            "type": "transfer", "category": "x", "amount": 1, "date": "2024-01-01"
        }));
        assert_eq!(err.code(), "invalid_field");
    }

    #[test]
    fn overlong_category_is_malformed() {
        let err = validation_err(serde_json::json!({
            "type": "income",
            "category": "c".repeat(MAX_CATEGORY_LEN + 1),
            "amount": 1,
            "date": "2024-01-01"
        }));
        assert!(matches!(err, ValidationError::Malformed { field: "category", .. }));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let tx = NewTransaction {
            kind: TransactionKind::Expense,
            category: "rent".to_string(),
            amount: d("400.00"),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: None,
        }
        .into_transaction(TransactionId::new(3));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "expense");
        assert_eq!(json["amount"], "400.00");
        assert_eq!(json["date"], "2024-01-01");
        assert!(json["description"].is_null());
    }
}
