//! Monthly income/expense summaries.

use std::str::FromStr;

use chrono::{Months, NaiveDate};
use rusqlite::params;
use rust_decimal::Decimal;

use crate::error::{FintrackError, FintrackResult};
use crate::models::{ReportTotals, TxnKind};
use crate::store::Store;

pub struct Reports<'a> {
    store: &'a Store,
}

impl<'a> Reports<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Income and expense totals for every transaction dated inside the
    /// calendar month. Month containment is exact calendar arithmetic, not
    /// string matching. Empty months report zero totals.
    pub fn monthly(&self, user_id: i64, month: u32, year: i32) -> FintrackResult<ReportTotals> {
        let (start, end) = month_bounds(month, year)?;
        Ok(ReportTotals {
            total_income: self.sum_kind(user_id, TxnKind::Income, start, end)?,
            total_expense: self.sum_kind(user_id, TxnKind::Expense, start, end)?,
        })
    }

    fn sum_kind(
        &self,
        user_id: i64,
        kind: TxnKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FintrackResult<Decimal> {
        let from_text = from.format("%Y-%m-%d").to_string();
        let to_text = to.format("%Y-%m-%d").to_string();
        let amounts: Vec<String> = self.store.with_retry(|conn| {
            let mut stmt = conn.prepare(
                "SELECT amount FROM transactions
                 WHERE user_id = ?1 AND kind = ?2 AND date >= ?3 AND date <= ?4",
            )?;
            let rows = stmt.query_map(
                params![user_id, kind.as_str(), from_text, to_text],
                |row| row.get(0),
            )?;
            rows.collect()
        })?;
        Ok(amounts
            .iter()
            .map(|s| Decimal::from_str(s).unwrap_or_default())
            .sum())
    }
}

/// First and last day of the given calendar month.
fn month_bounds(month: u32, year: i32) -> FintrackResult<(NaiveDate, NaiveDate)> {
    if year <= 0 {
        return Err(FintrackError::invalid("year must be positive"));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| FintrackError::invalid("month must be between 1 and 12"))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| FintrackError::invalid("month is out of range"))?;
    Ok((start, end))
}
