use rust_decimal::Decimal;

/// A per-category monthly spending ceiling. At most one row exists per
/// (user_id, category, month, year); re-setting the same key overwrites
/// the limit.
#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub monthly_limit: Decimal,
    /// 1-12
    pub month: u32,
    pub year: i32,
}

/// Outcome of checking spend-to-date against the configured limit.
/// Computed fresh per evaluation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetStatus {
    NoBudgetSet,
    WithinBudget { spent: Decimal, limit: Decimal },
    OverBudget { spent: Decimal, limit: Decimal },
}
