//! Database schema definitions.
//!
//! Details are stored purely in parent-pointer form: `parent_detail_id`
//! references a sibling row of the same checklist, and sibling order is
//! insertion order (`rowid`), so no position column is needed.

use rusqlite::{Connection, Result};

/// Current schema version for migration tracking.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the TickList database.
///
/// Timestamps are stored as INTEGER Unix milliseconds.
pub const SCHEMA_SQL: &str = r"
-- ====================
-- Schema Version Tracking
-- ====================

CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- ====================
-- Core Tables
-- ====================

-- Checklist roots: title, owner, timestamps
CREATE TABLE IF NOT EXISTS checklists (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_checklists_user ON checklists(user_id);

-- Checklist details: the flat parent-pointer representation.
-- children are never stored; the tree view is derived on read.
CREATE TABLE IF NOT EXISTS checklist_details (
    id TEXT PRIMARY KEY,
    checklist_id TEXT NOT NULL,
    parent_detail_id TEXT,
    task TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    FOREIGN KEY (checklist_id) REFERENCES checklists(id)
);

CREATE INDEX IF NOT EXISTS idx_details_checklist ON checklist_details(checklist_id);
CREATE INDEX IF NOT EXISTS idx_details_parent ON checklist_details(parent_detail_id);

-- ====================
-- Audit Events
-- ====================

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type TEXT NOT NULL,
    entity_id TEXT NOT NULL,
    event_type TEXT NOT NULL,
    actor TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id);
";

/// Apply the schema to a connection. Idempotent.
///
/// # Errors
///
/// Returns an error if a pragma or DDL statement fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Set pragmas before schema creation
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    conn.execute_batch(SCHEMA_SQL)?;

    // Record schema version
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![
            format!("v{CURRENT_SCHEMA_VERSION}"),
            chrono::Utc::now().timestamp_millis()
        ],
    )?;

    Ok(())
}
