//! Budget limits and spend-to-date evaluation.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{FintrackError, FintrackResult};
use crate::ledger::Ledger;
use crate::models::{Budget, BudgetStatus, TxnKind};
use crate::store::Store;

pub struct BudgetBook<'a> {
    store: &'a Store,
}

impl<'a> BudgetBook<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Atomic upsert keyed by (user, category, month, year): insert if
    /// absent, overwrite the limit if present. A single conditional write,
    /// never read-then-write, so two concurrent setters cannot both insert.
    /// Lock contention is absorbed by the gateway retry and surfaces as
    /// `StoreBusy` once the attempts are exhausted.
    pub fn set_budget(
        &self,
        user_id: i64,
        category: &str,
        monthly_limit: Decimal,
        month: u32,
        year: i32,
    ) -> FintrackResult<()> {
        if category.trim().is_empty() {
            return Err(FintrackError::invalid("category must not be empty"));
        }
        if monthly_limit <= Decimal::ZERO {
            return Err(FintrackError::invalid("monthly limit must be positive"));
        }
        if !(1..=12).contains(&month) {
            return Err(FintrackError::invalid("month must be between 1 and 12"));
        }
        if year <= 0 {
            return Err(FintrackError::invalid("year must be positive"));
        }

        let limit_text = monthly_limit.to_string();
        self.store.with_retry(|conn| {
            conn.execute(
                "INSERT INTO budgets (user_id, category, monthly_limit, month, year)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, category, month, year)
                 DO UPDATE SET monthly_limit = excluded.monthly_limit",
                params![user_id, category, limit_text, month, year],
            )
            .map(|_| ())
        })
    }

    /// The configured limit for a key, or `None` when no budget is set.
    /// Absence is a normal outcome, not an error.
    pub fn get_limit(
        &self,
        user_id: i64,
        category: &str,
        month: u32,
        year: i32,
    ) -> FintrackResult<Option<Decimal>> {
        let text: Option<String> = self.store.with_retry(|conn| {
            conn.query_row(
                "SELECT monthly_limit FROM budgets
                 WHERE user_id = ?1 AND category = ?2 AND month = ?3 AND year = ?4",
                params![user_id, category, month, year],
                |row| row.get(0),
            )
            .optional()
        })?;
        Ok(text.map(|s| Decimal::from_str(&s).unwrap_or_default()))
    }

    /// All budgets for one user, newest period first.
    pub fn list(&self, user_id: i64) -> FintrackResult<Vec<Budget>> {
        self.store.with_retry(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, category, monthly_limit, month, year FROM budgets
                 WHERE user_id = ?1 ORDER BY year DESC, month DESC, category",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let limit_text: String = row.get(3)?;
                Ok(Budget {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    category: row.get(2)?,
                    monthly_limit: Decimal::from_str(&limit_text).unwrap_or_default(),
                    month: row.get(4)?,
                    year: row.get(5)?,
                })
            })?;
            rows.collect()
        })
    }
}

/// Classifies spend-to-date for a category against its configured limit.
///
/// The aggregate window is [first day of `date`'s month, `date`] inclusive,
/// so a mid-month transaction is judged against spend so far, not a
/// projected full month. Only expenses count; income never consumes budget.
/// Spent exactly equal to the limit is within budget. This is a pure
/// function of stored state at call time; nothing is cached.
pub fn evaluate(
    store: &Store,
    user_id: i64,
    category: &str,
    date: NaiveDate,
) -> FintrackResult<BudgetStatus> {
    let window_start = date.with_day(1).unwrap_or(date);
    let spent = Ledger::new(store).aggregate(
        user_id,
        category,
        TxnKind::Expense,
        window_start,
        date,
    )?;
    let limit = BudgetBook::new(store).get_limit(user_id, category, date.month(), date.year())?;

    Ok(match limit {
        None => BudgetStatus::NoBudgetSet,
        Some(limit) if spent > limit => BudgetStatus::OverBudget { spent, limit },
        Some(limit) => BudgetStatus::WithinBudget { spent, limit },
    })
}
