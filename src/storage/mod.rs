//! Storage layer for TickList.
//!
//! The checklist service talks to storage through the [`ChecklistStore`]
//! repository contract: plain reads plus a `mutate` unit-of-work protocol.
//! Every mutating request runs inside exactly one `mutate` call — the
//! closure receives the transaction's row operations ([`ChecklistTx`]) and
//! a [`MutationContext`] collecting audit events; the store commits on
//! success and rolls back on any error, so no partial write ever survives
//! a failed request.
//!
//! # Implementations
//!
//! - [`sqlite`] - rusqlite-backed store (WAL, IMMEDIATE transactions)
//! - [`memory`] - in-memory reference implementation (staged-copy commits)
//! - [`events`] - audit event rows shared by both
//! - [`schema`] - SQLite schema definitions

pub mod events;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use events::{Event, EventType};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::model::{ChecklistDetail, ChecklistRoot};

/// Context for a mutation operation, tracking side effects.
///
/// Passed to mutation closures to record audit events; the store writes
/// the collected events inside the same transaction just before commit.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation (the calling user id).
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an audit event for this operation.
    pub fn record_event(&mut self, entity_type: &str, entity_id: &str, event_type: EventType) {
        self.events
            .push(Event::new(entity_type, entity_id, event_type, &self.actor));
    }
}

/// Row operations available inside one transaction.
///
/// Object-safe so `mutate` closures can stay implementation-agnostic.
/// Update/delete of an absent row is a no-op, matching SQL semantics —
/// existence checks belong to the service, before the transaction opens.
pub trait ChecklistTx {
    fn insert_root(&mut self, root: &ChecklistRoot) -> Result<()>;

    /// Update the root's mutable fields (title, modification timestamp).
    fn update_root(&mut self, id: &str, title: &str, updated_at: i64) -> Result<()>;

    fn delete_root(&mut self, id: &str) -> Result<()>;

    fn insert_detail(&mut self, detail: &ChecklistDetail) -> Result<()>;

    /// Update a detail's mutable fields in place; id, `checklist_id`, and
    /// `parent_detail_id` never change.
    fn update_detail(&mut self, id: &str, task: &str, done: bool, updated_at: i64) -> Result<()>;

    fn delete_detail(&mut self, id: &str) -> Result<()>;

    /// Delete every detail row belonging to a checklist.
    fn delete_details_of(&mut self, checklist_id: &str) -> Result<()>;
}

/// Repository contract consumed by the checklist service.
pub trait ChecklistStore {
    /// Execute a mutation with the transaction protocol.
    ///
    /// Opens one transaction, runs the closure, writes the collected
    /// audit events, and commits. Any error at any step rolls the whole
    /// transaction back and propagates — the caller owns mapping it to a
    /// boundary error code.
    ///
    /// # Errors
    ///
    /// Returns an error if the closure or any storage step fails.
    fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn ChecklistTx, &mut MutationContext) -> Result<R>,
        Self: Sized;

    /// Get a checklist root by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_root(&self, id: &str) -> Result<Option<ChecklistRoot>>;

    /// List all roots owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_roots_for_user(&self, user_id: &str) -> Result<Vec<ChecklistRoot>>;

    /// Get a checklist's details as the stored flat list, insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_details(&self, checklist_id: &str) -> Result<Vec<ChecklistDetail>>;

    /// List audit events recorded for an entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_events(&self, entity_id: &str, limit: Option<u32>) -> Result<Vec<Event>>;
}
