//! Append-only transaction ledger.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::params;
use rust_decimal::Decimal;

use crate::error::{FintrackError, FintrackResult};
use crate::models::{Transaction, TxnKind};
use crate::store::Store;

pub struct Ledger<'a> {
    store: &'a Store,
}

impl<'a> Ledger<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Writes one immutable transaction row and returns the stored record
    /// with its assigned id. The date is resolved by the caller; a missing
    /// date defaults to "today" at the boundary layer, not here.
    pub fn append(
        &self,
        user_id: i64,
        category: &str,
        amount: Decimal,
        kind: TxnKind,
        date: NaiveDate,
    ) -> FintrackResult<Transaction> {
        if category.trim().is_empty() {
            return Err(FintrackError::invalid("category must not be empty"));
        }
        if amount <= Decimal::ZERO {
            return Err(FintrackError::invalid("amount must be positive"));
        }

        let amount_text = amount.to_string();
        let date_text = date.format("%Y-%m-%d").to_string();
        let id = self.store.with_retry(|conn| {
            conn.execute(
                "INSERT INTO transactions (user_id, category, amount, kind, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![user_id, category, amount_text, kind.as_str(), date_text],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Transaction {
            id: Some(id),
            user_id,
            category: category.to_string(),
            amount,
            kind,
            date,
        })
    }

    /// Sum of amounts for a (user, category, kind) triple over the inclusive
    /// date range. Returns zero when no rows match; callers never see an
    /// absent value. Summed in Rust as decimals so the result is exact.
    pub fn aggregate(
        &self,
        user_id: i64,
        category: &str,
        kind: TxnKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> FintrackResult<Decimal> {
        let from_text = from.format("%Y-%m-%d").to_string();
        let to_text = to.format("%Y-%m-%d").to_string();
        let amounts: Vec<String> = self.store.with_retry(|conn| {
            let mut stmt = conn.prepare(
                "SELECT amount FROM transactions
                 WHERE user_id = ?1 AND category = ?2 AND kind = ?3
                   AND date >= ?4 AND date <= ?5",
            )?;
            let rows = stmt.query_map(
                params![user_id, category, kind.as_str(), from_text, to_text],
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

#[cfg(test)]
mod tests;
