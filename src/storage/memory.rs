//! In-memory storage implementation.
//!
//! Reference implementation of the store contract, used by service tests
//! and available as a scratch backend. Transactions are staged copies:
//! the mutation closure works on a clone of the tables, and the clone
//! replaces the live tables only when every step succeeded — the same
//! all-or-nothing visibility the SQLite backend gets from rollback.

use crate::error::{Error, Result};
use crate::model::{ChecklistDetail, ChecklistRoot};
use crate::storage::events::Event;
use crate::storage::{ChecklistStore, ChecklistTx, MutationContext};

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    roots: Vec<ChecklistRoot>,
    details: Vec<ChecklistDetail>,
    events: Vec<Event>,

    /// Fault injection: when set, `mutate` fails at the commit step and
    /// discards the staged state. Lets tests observe atomicity without a
    /// real storage failure.
    pub fail_commits: bool,
}

/// Staged table copies for one in-flight transaction.
struct MemoryTx {
    roots: Vec<ChecklistRoot>,
    details: Vec<ChecklistDetail>,
}

impl ChecklistTx for MemoryTx {
    fn insert_root(&mut self, root: &ChecklistRoot) -> Result<()> {
        if self.roots.iter().any(|r| r.id == root.id) {
            return Err(Error::Other(format!("duplicate checklist id {}", root.id)));
        }
        self.roots.push(root.clone());
        Ok(())
    }

    fn update_root(&mut self, id: &str, title: &str, updated_at: i64) -> Result<()> {
        if let Some(root) = self.roots.iter_mut().find(|r| r.id == id) {
            root.title = title.to_string();
            root.updated_at = Some(updated_at);
        }
        Ok(())
    }

    fn delete_root(&mut self, id: &str) -> Result<()> {
        self.roots.retain(|r| r.id != id);
        Ok(())
    }

    fn insert_detail(&mut self, detail: &ChecklistDetail) -> Result<()> {
        if self.details.iter().any(|d| d.id == detail.id) {
            return Err(Error::Other(format!("duplicate detail id {}", detail.id)));
        }
        self.details.push(detail.clone());
        Ok(())
    }

    fn update_detail(&mut self, id: &str, task: &str, done: bool, updated_at: i64) -> Result<()> {
        if let Some(detail) = self.details.iter_mut().find(|d| d.id == id) {
            detail.task = task.to_string();
            detail.done = done;
            detail.updated_at = Some(updated_at);
        }
        Ok(())
    }

    fn delete_detail(&mut self, id: &str) -> Result<()> {
        self.details.retain(|d| d.id != id);
        Ok(())
    }

    fn delete_details_of(&mut self, checklist_id: &str) -> Result<()> {
        self.details.retain(|d| d.checklist_id != checklist_id);
        Ok(())
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChecklistStore for MemoryStore {
    fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn ChecklistTx, &mut MutationContext) -> Result<R>,
    {
        let mut staged = MemoryTx {
            roots: self.roots.clone(),
            details: self.details.clone(),
        };
        let mut ctx = MutationContext::new(op, actor);

        let result = f(&mut staged, &mut ctx)?;

        if self.fail_commits {
            return Err(Error::Other(format!("injected commit failure in {op}")));
        }

        // Commit: staged state becomes the live state.
        self.roots = staged.roots;
        self.details = staged.details;
        self.events.append(&mut ctx.events);

        Ok(result)
    }

    fn get_root(&self, id: &str) -> Result<Option<ChecklistRoot>> {
        Ok(self.roots.iter().find(|r| r.id == id).cloned())
    }

    fn list_roots_for_user(&self, user_id: &str) -> Result<Vec<ChecklistRoot>> {
        Ok(self
            .roots
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_details(&self, checklist_id: &str) -> Result<Vec<ChecklistDetail>> {
        Ok(self
            .details
            .iter()
            .filter(|d| d.checklist_id == checklist_id)
            .cloned()
            .collect())
    }

    fn list_events(&self, entity_id: &str, limit: Option<u32>) -> Result<Vec<Event>> {
        let limit = limit.unwrap_or(100) as usize;
        Ok(self
            .events
            .iter()
            .rev()
            .filter(|e| e.entity_id == entity_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
