mod auth;
mod budget;
mod error;
mod ledger;
mod models;
mod report;
mod run;
mod snapshot;
mod store;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    let store = store::Store::open(&db_path)?;

    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }
    run::as_cli(&args, &store)
}

fn get_db_path() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "Fintrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("fintrack.db"))
}
