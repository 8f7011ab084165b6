//! Error types for fintrack.
//!
//! Every failure the core can produce carries a kind the boundary layer can
//! match on. "Not found" outcomes (no budget configured, unknown login) are
//! represented as `Option`, never as errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FintrackError {
    /// Malformed amount, date, kind, month, year or category. Recoverable by
    /// the caller re-prompting; never retried internally.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Lock contention on the shared store file exhausted the retry budget.
    /// Safe to retry the whole operation later.
    #[error("Store is busy, try again later")]
    StoreBusy,

    /// A store-level uniqueness or foreign-key violation outside the expected
    /// upsert path. Retrying cannot help.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Any other store failure (I/O, corruption, misuse).
    #[error("Store error: {0}")]
    Store(String),
}

impl FintrackError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::StoreBusy)
    }
}

pub type FintrackResult<T> = Result<T, FintrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FintrackError::invalid("amount must be positive");
        assert_eq!(err.to_string(), "Invalid input: amount must be positive");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_busy_display() {
        let err = FintrackError::StoreBusy;
        assert_eq!(err.to_string(), "Store is busy, try again later");
        assert!(err.is_busy());
    }

    #[test]
    fn test_constraint_not_busy() {
        let err = FintrackError::Constraint("UNIQUE failed".into());
        assert!(!err.is_busy());
        assert!(!err.is_invalid_input());
    }
}
