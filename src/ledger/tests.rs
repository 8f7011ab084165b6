#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::auth::Authenticator;
use crate::error::FintrackError;
use crate::store::Store;

use super::*;

fn temp_store_with_user() -> (tempfile::TempDir, Store, i64) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("fintrack.db")).unwrap();
    let user_id = Authenticator::new(&store).register("alice", "pw").unwrap();
    (dir, store, user_id)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── append ────────────────────────────────────────────────────

#[test]
fn test_append_returns_stored_record() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    let txn = ledger
        .append(user_id, "Groceries", dec!(42.50), TxnKind::Expense, date(2024, 3, 15))
        .unwrap();

    assert!(txn.id.unwrap() > 0);
    assert_eq!(txn.user_id, user_id);
    assert_eq!(txn.category, "Groceries");
    assert_eq!(txn.amount, dec!(42.50));
    assert!(txn.is_expense());
    assert_eq!(txn.date, date(2024, 3, 15));
}

#[test]
fn test_append_rejects_non_positive_amount() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    let zero = ledger.append(user_id, "Groceries", Decimal::ZERO, TxnKind::Expense, date(2024, 3, 15));
    assert!(matches!(zero, Err(FintrackError::InvalidInput(_))));

    let negative = ledger.append(user_id, "Groceries", dec!(-5), TxnKind::Income, date(2024, 3, 15));
    assert!(matches!(negative, Err(FintrackError::InvalidInput(_))));
}

#[test]
fn test_append_rejects_empty_category() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    for cat in ["", "   "] {
        let result = ledger.append(user_id, cat, dec!(10), TxnKind::Expense, date(2024, 3, 15));
        assert!(matches!(result, Err(FintrackError::InvalidInput(_))));
    }
}

// ── aggregate ─────────────────────────────────────────────────

#[test]
fn test_append_then_aggregate_counts_once() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    ledger
        .append(user_id, "Coffee", dec!(4.75), TxnKind::Expense, date(2024, 3, 15))
        .unwrap();

    let sum = ledger
        .aggregate(user_id, "Coffee", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, dec!(4.75));
}

#[test]
fn test_aggregate_empty_is_zero() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    let sum = ledger
        .aggregate(user_id, "Coffee", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, Decimal::ZERO);
}

#[test]
fn test_aggregate_range_is_inclusive() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    for (day, amount) in [(1, dec!(10)), (15, dec!(20)), (31, dec!(30))] {
        ledger
            .append(user_id, "Food", amount, TxnKind::Expense, date(2024, 3, day))
            .unwrap();
    }

    // Both endpoints included.
    let sum = ledger
        .aggregate(user_id, "Food", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, dec!(60));

    // Narrowed range drops the boundary days.
    let sum = ledger
        .aggregate(user_id, "Food", TxnKind::Expense, date(2024, 3, 2), date(2024, 3, 30))
        .unwrap();
    assert_eq!(sum, dec!(20));
}

#[test]
fn test_aggregate_filters_kind() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    ledger
        .append(user_id, "Side Gig", dec!(200), TxnKind::Income, date(2024, 3, 10))
        .unwrap();
    ledger
        .append(user_id, "Side Gig", dec!(50), TxnKind::Expense, date(2024, 3, 10))
        .unwrap();

    let expense = ledger
        .aggregate(user_id, "Side Gig", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(expense, dec!(50));

    let income = ledger
        .aggregate(user_id, "Side Gig", TxnKind::Income, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(income, dec!(200));
}

#[test]
fn test_aggregate_filters_user() {
    let (_dir, store, user_id) = temp_store_with_user();
    let other_id = Authenticator::new(&store).register("bob", "pw").unwrap();
    let ledger = Ledger::new(&store);

    ledger
        .append(user_id, "Food", dec!(10), TxnKind::Expense, date(2024, 3, 10))
        .unwrap();
    ledger
        .append(other_id, "Food", dec!(99), TxnKind::Expense, date(2024, 3, 10))
        .unwrap();

    let sum = ledger
        .aggregate(user_id, "Food", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, dec!(10));
}

#[test]
fn test_aggregate_category_case_sensitive() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    ledger
        .append(user_id, "Food", dec!(10), TxnKind::Expense, date(2024, 3, 10))
        .unwrap();
    ledger
        .append(user_id, "food", dec!(20), TxnKind::Expense, date(2024, 3, 10))
        .unwrap();

    let sum = ledger
        .aggregate(user_id, "Food", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, dec!(10));
}

#[test]
fn test_aggregate_decimal_precision() {
    let (_dir, store, user_id) = temp_store_with_user();
    let ledger = Ledger::new(&store);

    for _ in 0..10 {
        ledger
            .append(user_id, "Micro", dec!(0.10), TxnKind::Expense, date(2024, 3, 10))
            .unwrap();
    }

    let sum = ledger
        .aggregate(user_id, "Micro", TxnKind::Expense, date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    assert_eq!(sum, dec!(1.00));
}
