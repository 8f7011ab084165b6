use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::auth::Authenticator;
use crate::budget::{self, BudgetBook};
use crate::ledger::Ledger;
use crate::models::{BudgetStatus, TxnKind};
use crate::report::Reports;
use crate::snapshot::Snapshot;
use crate::store::Store;

pub(crate) fn as_cli(args: &[String], store: &Store) -> Result<()> {
    match args[1].as_str() {
        "register" => cmd_register(&args[2..], store),
        "add" => cmd_add(&args[2..], store),
        "set-budget" => cmd_set_budget(&args[2..], store),
        "report" => cmd_report(&args[2..], store),
        "budgets" => cmd_budgets(&args[2..], store),
        "export" => cmd_export(&args[2..], store),
        "import" => cmd_import(&args[2..], store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn print_usage() {
    println!("Fintrack — local-only personal finance manager");
    println!();
    println!("Usage: fintrack <command> [--user <name> --password <pw>]");
    println!();
    println!("Commands:");
    println!("  register <username> <password>             Create a user");
    println!("  add <category> <amount> <kind> [date]      Record a transaction");
    println!("                                             kind is income or expense;");
    println!("                                             date is YYYY-MM-DD (default: today)");
    println!("  set-budget <category> <limit> <mm> <yyyy>  Set a monthly category limit");
    println!("  report <mm> <yyyy>                         Monthly income/expense summary");
    println!("  budgets                                    List configured budgets");
    println!("  export [path]                              Write a full snapshot (default:");
    println!("                                             fintrack-backup.sql)");
    println!("  import <path>                              Restore a snapshot, replacing all data");
    println!("  --help, -h                                 Show this help");
    println!("  --version, -V                              Show version");
}

// ── Commands ─────────────────────────────────────────────────

fn cmd_register(args: &[String], store: &Store) -> Result<()> {
    let pos = positionals(args);
    let (username, password) = match pos.as_slice() {
        [u, p] => (*u, *p),
        _ => anyhow::bail!("Usage: fintrack register <username> <password>"),
    };
    let id = Authenticator::new(store).register(username, password)?;
    println!("Registered '{username}' (user {id}).");
    Ok(())
}

fn cmd_add(args: &[String], store: &Store) -> Result<()> {
    let user_id = resolve_user(args, store)?;
    let pos = positionals(args);
    if pos.len() < 3 {
        anyhow::bail!("Usage: fintrack add <category> <amount> <kind> [date]");
    }

    let category = pos[0];
    let amount = Decimal::from_str(pos[1])
        .map_err(|_| anyhow::anyhow!("Invalid amount: {}", pos[1]))?;
    let kind = TxnKind::parse(pos[2])
        .ok_or_else(|| anyhow::anyhow!("Invalid kind '{}': use income or expense", pos[2]))?;
    // A missing date defaults to today, resolved here at the boundary.
    let date = match pos.get(3) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid date '{raw}': use YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };

    let txn = Ledger::new(store).append(user_id, category, amount, kind, date)?;
    println!(
        "Added {} of {} in '{}' on {}.",
        txn.kind, txn.amount, txn.category, txn.date
    );

    // Budgets constrain spending, not earning.
    if txn.is_expense() {
        match budget::evaluate(store, user_id, category, date)? {
            BudgetStatus::NoBudgetSet => {
                println!("No budget set for category '{category}'.");
            }
            BudgetStatus::WithinBudget { spent, limit } => {
                println!("Within budget for '{category}': spent {spent} of {limit}.");
            }
            BudgetStatus::OverBudget { spent, limit } => {
                println!("Warning: budget exceeded for '{category}': spent {spent} of {limit}.");
            }
        }
    }
    Ok(())
}

fn cmd_set_budget(args: &[String], store: &Store) -> Result<()> {
    let user_id = resolve_user(args, store)?;
    let pos = positionals(args);
    if pos.len() != 4 {
        anyhow::bail!("Usage: fintrack set-budget <category> <limit> <month> <year>");
    }

    let category = pos[0];
    let limit = Decimal::from_str(pos[1])
        .map_err(|_| anyhow::anyhow!("Invalid limit: {}", pos[1]))?;
    let month: u32 = pos[2]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid month: {}", pos[2]))?;
    let year: i32 = pos[3]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid year: {}", pos[3]))?;

    match BudgetBook::new(store).set_budget(user_id, category, limit, month, year) {
        Ok(()) => {
            println!("Budget for '{category}' in {month}-{year} set to {limit}.");
            Ok(())
        }
        Err(e) if e.is_busy() => {
            anyhow::bail!("{e} (another session holds the store lock)")
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_report(args: &[String], store: &Store) -> Result<()> {
    let user_id = resolve_user(args, store)?;
    let pos = positionals(args);
    if pos.len() != 2 {
        anyhow::bail!("Usage: fintrack report <month> <year>");
    }
    let month: u32 = pos[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid month: {}", pos[0]))?;
    let year: i32 = pos[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid year: {}", pos[1]))?;

    let totals = Reports::new(store).monthly(user_id, month, year)?;
    println!("Monthly report for {month}/{year}:");
    println!("  Income:   {:.2}", totals.total_income);
    println!("  Expenses: {:.2}", totals.total_expense);
    println!("  Savings:  {:.2}", totals.savings());
    Ok(())
}

fn cmd_budgets(args: &[String], store: &Store) -> Result<()> {
    let user_id = resolve_user(args, store)?;
    let budgets = BudgetBook::new(store).list(user_id)?;
    if budgets.is_empty() {
        println!("No budgets set");
        return Ok(());
    }

    println!("{:<20} {:<8} {:<6} Limit", "Category", "Month", "Year");
    println!("{}", "─".repeat(44));
    for b in &budgets {
        println!(
            "{:<20} {:<8} {:<6} {:.2}",
            b.category, b.month, b.year, b.monthly_limit
        );
    }
    Ok(())
}

fn cmd_export(args: &[String], store: &Store) -> Result<()> {
    let path = positionals(args)
        .first()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "fintrack-backup.sql".into());

    let dump = Snapshot::new(store).export()?;
    std::fs::write(&path, &dump)?;
    println!("Data backed up to '{path}'.");
    Ok(())
}

fn cmd_import(args: &[String], store: &Store) -> Result<()> {
    let pos = positionals(args);
    let path = pos
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack import <path>"))?;
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }

    let dump = std::fs::read_to_string(path)?;
    match Snapshot::new(store).import(&dump) {
        Ok(()) => {
            println!("Data restored from '{path}'.");
            Ok(())
        }
        Err(e) if e.is_invalid_input() => {
            anyhow::bail!("'{path}' is not a fintrack snapshot")
        }
        Err(e) => Err(e.into()),
    }
}

// ── Argument helpers ─────────────────────────────────────────

/// Every per-user operation requires explicit credentials; there is no
/// implicit "logged in" state between invocations.
fn resolve_user(args: &[String], store: &Store) -> Result<i64> {
    let username = flag_value(args, "--user")
        .ok_or_else(|| anyhow::anyhow!("Missing --user <name>"))?;
    let password = flag_value(args, "--password")
        .ok_or_else(|| anyhow::anyhow!("Missing --password <pw>"))?;
    Authenticator::new(store)
        .login(username, password)?
        .ok_or_else(|| anyhow::anyhow!("Invalid username or password"))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are not a `--flag value` pair, in order.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += 2;
        } else {
            out.push(args[i].as_str());
            i += 1;
        }
    }
    out
}
