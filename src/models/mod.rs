mod budget;
mod report;
mod transaction;

pub use budget::{Budget, BudgetStatus};
pub use report::ReportTotals;
pub use transaction::{Transaction, TxnKind};
