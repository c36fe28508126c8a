//! Initialize the TickList database.
//!
//! Creates `~/.ticklist/ticklist.db` (or the `--db`/`TICK_DB` override)
//! and applies the schema. One-time setup per machine.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStore;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
}

/// Execute the init command.
///
/// # Errors
///
/// `AlreadyInitialized` when the database exists and `--force` was not
/// given; otherwise I/O or database errors from creation.
pub fn execute(db_path: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path)
        .ok_or_else(|| Error::Config("Could not determine the TickList directory".to_string()))?;

    if db_path.exists() && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if force && db_path.exists() {
        fs::remove_file(&db_path)?;
    }

    // Opening applies the schema.
    SqliteStore::open(&db_path)?;

    if json {
        let output = InitOutput { database: db_path };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Initialized TickList database");
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: tick checklist create \"My first list\" --user <your-id>");
    }

    Ok(())
}
