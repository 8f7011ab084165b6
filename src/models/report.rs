use rust_decimal::Decimal;

/// Monthly income/expense totals for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTotals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
}

impl ReportTotals {
    /// Income minus expense. Negative savings is a valid, reportable state.
    pub fn savings(&self) -> Decimal {
        self.total_income - self.total_expense
    }
}
