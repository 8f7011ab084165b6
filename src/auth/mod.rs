//! User registration and login.
//!
//! The rest of the crate only ever sees the opaque user id this module
//! produces; every per-user operation takes that id as an explicit
//! precondition and never re-checks identity itself.

use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::error::{FintrackError, FintrackResult};
use crate::store::Store;

pub struct Authenticator<'a> {
    store: &'a Store,
}

impl<'a> Authenticator<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Creates a user and returns its id. A duplicate username surfaces as a
    /// constraint violation.
    pub fn register(&self, username: &str, password: &str) -> FintrackResult<i64> {
        if username.is_empty() {
            return Err(FintrackError::invalid("username must not be empty"));
        }
        if password.is_empty() {
            return Err(FintrackError::invalid("password must not be empty"));
        }
        let hash = hash_password(password);
        self.store.with_retry(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username, hash],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Resolves credentials to a user id. `None` means the credentials did
    /// not match; that is a normal outcome, not an error.
    pub fn login(&self, username: &str, password: &str) -> FintrackResult<Option<i64>> {
        let hash = hash_password(password);
        self.store.with_retry(|conn| {
            conn.query_row(
                "SELECT id FROM users WHERE username = ?1 AND password_hash = ?2",
                params![username, hash],
                |row| row.get(0),
            )
            .optional()
        })
    }
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{digest:x}")
}
