//! SQLite storage implementation.
//!
//! The production backend. Follows the `MutationContext` pattern for
//! transaction discipline and audit logging: every mutation runs inside
//! one IMMEDIATE transaction that either commits whole or rolls back
//! whole.

use crate::error::Result;
use crate::model::{ChecklistDetail, ChecklistRoot};
use crate::storage::events::{Event, get_events, insert_event};
use crate::storage::schema::apply_schema;
use crate::storage::{ChecklistStore, ChecklistTx, MutationContext};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use std::time::Duration;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Row operations bound to one open transaction.
struct SqliteTx<'a> {
    tx: &'a Transaction<'a>,
}

impl ChecklistTx for SqliteTx<'_> {
    fn insert_root(&mut self, root: &ChecklistRoot) -> Result<()> {
        self.tx.execute(
            "INSERT INTO checklists (id, user_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![root.id, root.user_id, root.title, root.created_at, root.updated_at],
        )?;
        Ok(())
    }

    fn update_root(&mut self, id: &str, title: &str, updated_at: i64) -> Result<()> {
        self.tx.execute(
            "UPDATE checklists SET title = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![title, updated_at, id],
        )?;
        Ok(())
    }

    fn delete_root(&mut self, id: &str) -> Result<()> {
        self.tx.execute("DELETE FROM checklists WHERE id = ?1", [id])?;
        Ok(())
    }

    fn insert_detail(&mut self, detail: &ChecklistDetail) -> Result<()> {
        self.tx.execute(
            "INSERT INTO checklist_details
                 (id, checklist_id, parent_detail_id, task, done, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                detail.id,
                detail.checklist_id,
                detail.parent_detail_id,
                detail.task,
                detail.done,
                detail.created_at,
                detail.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_detail(&mut self, id: &str, task: &str, done: bool, updated_at: i64) -> Result<()> {
        self.tx.execute(
            "UPDATE checklist_details SET task = ?1, done = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![task, done, updated_at, id],
        )?;
        Ok(())
    }

    fn delete_detail(&mut self, id: &str) -> Result<()> {
        self.tx
            .execute("DELETE FROM checklist_details WHERE id = ?1", [id])?;
        Ok(())
    }

    fn delete_details_of(&mut self, checklist_id: &str) -> Result<()> {
        self.tx.execute(
            "DELETE FROM checklist_details WHERE checklist_id = ?1",
            [checklist_id],
        )?;
        Ok(())
    }
}

fn map_root(row: &Row) -> rusqlite::Result<ChecklistRoot> {
    Ok(ChecklistRoot {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_detail(row: &Row) -> rusqlite::Result<ChecklistDetail> {
    Ok(ChecklistDetail {
        id: row.get(0)?,
        checklist_id: row.get(1)?,
        parent_detail_id: row.get(2)?,
        task: row.get(3)?,
        done: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        children: Vec::new(),
    })
}

impl ChecklistStore for SqliteStore {
    fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn ChecklistTx, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        let result = {
            let mut stx = SqliteTx { tx: &tx };
            f(&mut stx, &mut ctx)?
        };

        // Write audit events inside the same transaction
        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    fn get_root(&self, id: &str) -> Result<Option<ChecklistRoot>> {
        let root = self
            .conn
            .prepare(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM checklists WHERE id = ?1",
            )?
            .query_row([id], map_root)
            .optional()?;

        Ok(root)
    }

    fn list_roots_for_user(&self, user_id: &str) -> Result<Vec<ChecklistRoot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, created_at, updated_at
             FROM checklists WHERE user_id = ?1
             ORDER BY created_at, rowid",
        )?;

        let rows = stmt.query_map([user_id], map_root)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_details(&self, checklist_id: &str) -> Result<Vec<ChecklistDetail>> {
        // rowid order = insertion order = the pre-order the tree was
        // flattened in, which keeps sibling order stable on reassembly.
        let mut stmt = self.conn.prepare(
            "SELECT id, checklist_id, parent_detail_id, task, done, created_at, updated_at
             FROM checklist_details WHERE checklist_id = ?1
             ORDER BY rowid",
        )?;

        let rows = stmt.query_map([checklist_id], map_detail)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_events(&self, entity_id: &str, limit: Option<u32>) -> Result<Vec<Event>> {
        Ok(get_events(&self.conn, entity_id, limit)?)
    }
}
