//! Store gateway: sole owner of the SQLite session lifecycle.
//!
//! Every operation acquires its own connection, applies the durability
//! pragmas, runs inside a single transaction and releases the connection on
//! every exit path. Two independent processes can share one store file; the
//! engine-level busy timeout plus the application-level retry loop absorb
//! ordinary lock contention, while real errors (constraint violations, I/O)
//! surface immediately.

mod schema;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::error::{FintrackError, FintrackResult};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    busy_timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl Store {
    /// Opens (creating if needed) the store at `path` with the default retry
    /// policy: 3 attempts, 1s backoff, 3s engine busy timeout.
    pub fn open(path: &Path) -> FintrackResult<Self> {
        Self::open_with_policy(path, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF)
    }

    /// Same as [`Store::open`] with an explicit retry policy. Configuration
    /// is fixed at construction and applies uniformly to every operation.
    pub fn open_with_policy(
        path: &Path,
        retry_attempts: u32,
        retry_backoff: Duration,
    ) -> FintrackResult<Self> {
        let store = Self {
            path: path.to_path_buf(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            retry_attempts: retry_attempts.max(1),
            retry_backoff,
        };
        store.with_retry(|conn| migrate(conn))?;
        Ok(store)
    }

    fn session(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(conn)
    }

    /// Runs `op` inside a single transaction on a scoped connection and
    /// returns its result. Busy/locked errors are retried up to the
    /// configured attempt count with a fixed backoff, then surface as
    /// [`FintrackError::StoreBusy`]; any other store error surfaces
    /// immediately without retry.
    pub fn with_retry<T>(
        &self,
        mut op: impl FnMut(&Connection) -> rusqlite::Result<T>,
    ) -> FintrackResult<T> {
        let mut attempt = 0;
        loop {
            match self.run_once(&mut op) {
                Ok(value) => return Ok(value),
                Err(err) if is_busy(&err) => {
                    attempt += 1;
                    if attempt >= self.retry_attempts {
                        return Err(FintrackError::StoreBusy);
                    }
                    thread::sleep(self.retry_backoff);
                }
                Err(err) => return Err(classify(err)),
            }
        }
    }

    fn run_once<T>(
        &self,
        op: &mut impl FnMut(&Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        let mut conn = self.session()?;
        let tx = conn.transaction()?;
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let has_version_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !has_version_table {
        conn.execute_batch(schema::SCHEMA_V1)?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![schema::CURRENT_VERSION],
        )?;
        return Ok(());
    }

    let current: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    for &(from_version, sql) in schema::MIGRATIONS {
        if current <= from_version {
            conn.execute_batch(sql)?;
        }
    }

    if current < schema::CURRENT_VERSION {
        conn.execute(
            "UPDATE schema_version SET version = ?1",
            params![schema::CURRENT_VERSION],
        )?;
    }

    Ok(())
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

fn classify(err: rusqlite::Error) -> FintrackError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            FintrackError::Constraint(err.to_string())
        }
        _ => FintrackError::Store(err.to_string()),
    }
}
