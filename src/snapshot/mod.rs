//! Full-store snapshot export/import.
//!
//! A snapshot is a replayable SQL statement log covering every table and row,
//! so importing it reconstructs identical store contents. Import fully
//! replaces existing state; it is not a merge. Neither operation is safe to
//! run concurrently with writers — callers must ensure no mutation is in
//! flight.

use rusqlite::Connection;

use crate::error::{FintrackError, FintrackResult};
use crate::store::Store;

const SNAPSHOT_HEADER: &str = "-- fintrack snapshot v1";

pub struct Snapshot<'a> {
    store: &'a Store,
}

impl<'a> Snapshot<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Serializes the entire store into a statement log. Replaying it on an
    /// empty (or populated) store reproduces exactly this content.
    pub fn export(&self) -> FintrackResult<String> {
        self.store.with_retry(|conn| {
            let mut dump = String::new();
            dump.push_str(SNAPSHOT_HEADER);
            dump.push('\n');
            // Children before parents so the replay's deletes pass the
            // foreign-key checks.
            dump.push_str("DELETE FROM transactions;\n");
            dump.push_str("DELETE FROM budgets;\n");
            dump.push_str("DELETE FROM users;\n");
            dump_users(conn, &mut dump)?;
            dump_transactions(conn, &mut dump)?;
            dump_budgets(conn, &mut dump)?;
            Ok(dump)
        })
    }

    /// Replays a statement log produced by [`Snapshot::export`], replacing
    /// all existing state in one transaction.
    pub fn import(&self, dump: &str) -> FintrackResult<()> {
        if !dump.starts_with(SNAPSHOT_HEADER) {
            return Err(FintrackError::invalid("not a fintrack snapshot"));
        }
        self.store.with_retry(|conn| conn.execute_batch(dump))
    }
}

fn dump_users(conn: &Connection, dump: &mut String) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("SELECT id, username, password_hash FROM users ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (id, username, hash) = row?;
        dump.push_str(&format!(
            "INSERT INTO users (id, username, password_hash) VALUES ({id}, '{}', '{}');\n",
            quote(&username),
            quote(&hash),
        ));
    }
    Ok(())
}

fn dump_transactions(conn: &Connection, dump: &mut String) -> rusqlite::Result<()> {
    let mut stmt = conn
        .prepare("SELECT id, user_id, category, amount, kind, date FROM transactions ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;
    for row in rows {
        let (id, user_id, category, amount, kind, date) = row?;
        dump.push_str(&format!(
            "INSERT INTO transactions (id, user_id, category, amount, kind, date) \
             VALUES ({id}, {user_id}, '{}', '{}', '{kind}', '{date}');\n",
            quote(&category),
            quote(&amount),
        ));
    }
    Ok(())
}

fn dump_budgets(conn: &Connection, dump: &mut String) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, category, monthly_limit, month, year FROM budgets ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, i64>(5)?,
        ))
    })?;
    for row in rows {
        let (id, user_id, category, limit, month, year) = row?;
        dump.push_str(&format!(
            "INSERT INTO budgets (id, user_id, category, monthly_limit, month, year) \
             VALUES ({id}, {user_id}, '{}', '{}', {month}, {year});\n",
            quote(&category),
            quote(&limit),
        ));
    }
    Ok(())
}

fn quote(s: &str) -> String {
    s.replace('\'', "''")
}
