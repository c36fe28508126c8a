//! Audit event storage and retrieval.
//!
//! Events track all mutations for debugging and history. They are written
//! inside the same transaction as the mutation they describe, so a rolled
//! back request leaves no trace.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    ChecklistCreated,
    ChecklistUpdated,
    ChecklistDeleted,

    DetailAdded,
    DetailUpdated,
    DetailRemoved,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChecklistCreated => "checklist_created",
            Self::ChecklistUpdated => "checklist_updated",
            Self::ChecklistDeleted => "checklist_deleted",
            Self::DetailAdded => "detail_added",
            Self::DetailUpdated => "detail_updated",
            Self::DetailRemoved => "detail_removed",
        }
    }
}

/// An audit event record.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by the database).
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            event_type,
            actor: actor.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            event.entity_type,
            event.entity_id,
            event.event_type.as_str(),
            event.actor,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get events for an entity, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events(conn: &Connection, entity_id: &str, limit: Option<u32>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(100);
    let mut stmt = conn.prepare(
        "SELECT id, entity_type, entity_id, event_type, actor, created_at
         FROM events
         WHERE entity_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(rusqlite::params![entity_id, limit], |row| {
        Ok(Event {
            id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            event_type: parse_event_type(row.get::<_, String>(3)?.as_str()),
            actor: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    rows.collect()
}

fn parse_event_type(s: &str) -> EventType {
    match s {
        "checklist_created" => EventType::ChecklistCreated,
        "checklist_deleted" => EventType::ChecklistDeleted,
        "detail_added" => EventType::DetailAdded,
        "detail_updated" => EventType::DetailUpdated,
        "detail_removed" => EventType::DetailRemoved,
        _ => EventType::ChecklistUpdated, // Fallback
    }
}
