use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Direction of a transaction. The amount itself is always positive; the
/// kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }

    /// Case-insensitive parse. Anything other than income/expense is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TxnKind::Income),
            "expense" => Some(TxnKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable once created; the core never updates or deletes a row.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxnKind,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }
}
