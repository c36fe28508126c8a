//! Configuration management.
//!
//! TickList keeps one global database per machine at
//! `~/.ticklist/ticklist.db`. Resolution order for every command:
//!
//! 1. `--db <path>` CLI flag
//! 2. `TICK_DB` environment variable
//! 3. the global location
//!
//! The calling user id resolves the same way: `--user` flag, then the
//! `TICK_USER` environment variable. There is no fallback — requests
//! without a caller fail validation with `USER_ID_NOT_SUPPLIED`.

use std::path::{Path, PathBuf};

/// Get the global TickList directory (`~/.ticklist`).
#[must_use]
pub fn global_ticklist_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".ticklist"))
}

/// Resolve the database path.
///
/// Priority: explicit CLI flag, `TICK_DB` environment variable, global
/// location. Returns `None` only when the home directory cannot be
/// determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var("TICK_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_ticklist_dir().map(|dir| dir.join("ticklist.db"))
}

/// Resolve the calling user id: explicit flag, then `TICK_USER`.
///
/// Empty means "not supplied" — validation rejects it downstream.
#[must_use]
pub fn resolve_user(explicit: Option<&str>) -> String {
    if let Some(user) = explicit {
        if !user.is_empty() {
            return user.to_string();
        }
    }

    std::env::var("TICK_USER").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_db_path_wins() {
        let explicit = PathBuf::from("/tmp/custom.db");
        let resolved = resolve_db_path(Some(&explicit)).unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_explicit_user_wins() {
        assert_eq!(resolve_user(Some("user_7")), "user_7");
    }
}
