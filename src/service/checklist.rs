//! Checklist service: CRUD orchestration for the checklist aggregate.
//!
//! Every request follows the same discipline: shape validation and
//! ownership checks run first, against live state, outside any
//! transaction; only then does the service open its single `mutate`
//! transaction and issue the row writes. A storage failure inside the
//! transaction rolls everything back and surfaces only the generic
//! `REPO_PROBLEM` code — the cause is logged server-side.
//!
//! Updates carry three independent change sets (add/update/delete)
//! reconciled against the stored flat detail list: deletions expand to
//! whole subtrees, unknown targets are rejected before any write, and a
//! detail marked both for update and (expanded) deletion is deleted.
//!
//! There is no concurrency token on the aggregate: two concurrent
//! updates of the same checklist are last-commit-wins.

use crate::error::{Error, Result};
use crate::model::{
    Checklist, ChecklistChanges, ChecklistRoot, NewChecklist, UpdateSummary, now_millis,
};
use crate::service::entity::{
    EntityService, Operation, OwnedEntity, RequestContext, Rule, ValidatedInput, has_id, has_input,
    has_title, has_user,
};
use crate::storage::{ChecklistStore, Event, EventType};
use crate::tree;
use std::collections::HashSet;

impl OwnedEntity for ChecklistRoot {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl ValidatedInput for NewChecklist {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }
}

impl ValidatedInput for ChecklistChanges {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }
}

fn missing_input() -> Error {
    Error::IncorrectInputData
}

fn missing_id() -> Error {
    Error::ChecklistIdNotSupplied
}

fn missing_user() -> Error {
    Error::UserIdNotSupplied
}

fn missing_title() -> Error {
    Error::ChecklistTitleNotSupplied
}

const CREATE_RULES: &[Rule] = &[
    Rule { check: has_input, fail: missing_input },
    Rule { check: has_user, fail: missing_user },
    Rule { check: has_title, fail: missing_title },
];

// Id before input: the most specific error must surface first.
const UPDATE_RULES: &[Rule] = &[
    Rule { check: has_id, fail: missing_id },
    Rule { check: has_input, fail: missing_input },
    Rule { check: has_user, fail: missing_user },
    Rule { check: has_title, fail: missing_title },
];

const READ_RULES: &[Rule] = &[
    Rule { check: has_id, fail: missing_id },
    Rule { check: has_user, fail: missing_user },
];

/// Service over any [`ChecklistStore`] implementation.
pub struct ChecklistService<S: ChecklistStore> {
    store: S,
}

impl<S: ChecklistStore> EntityService for ChecklistService<S> {
    type Entity = ChecklistRoot;

    fn rules(op: Operation) -> &'static [Rule] {
        match op {
            Operation::Create => CREATE_RULES,
            Operation::Update => UPDATE_RULES,
            Operation::ReadById | Operation::Delete => READ_RULES,
        }
    }

    fn load(&self, id: &str) -> Result<Option<ChecklistRoot>> {
        self.store.get_root(id)
    }
}

impl<S: ChecklistStore> ChecklistService<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store (read paths at the boundary).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// List all checklist roots owned by the caller (flat; details and
    /// tree reconstruction belong to the presentation boundary).
    ///
    /// # Errors
    ///
    /// `UserIdNotSupplied` when the context has no user id.
    pub fn list_for_user(&self, ctx: &RequestContext) -> Result<Vec<ChecklistRoot>> {
        if ctx.user_id.is_empty() {
            return Err(Error::UserIdNotSupplied);
        }
        self.store.list_roots_for_user(&ctx.user_id)
    }

    /// Get one checklist aggregate: root plus flat detail list.
    ///
    /// # Errors
    ///
    /// Validation, `EntityNotFound`, or `EntityDoesNotBelongToUser`.
    pub fn get_by_id(&self, ctx: &RequestContext, id: &str) -> Result<Checklist> {
        let root = self.fetch_checked(Operation::ReadById, ctx, Some(id), None)?;
        let details = self.store.get_details(&root.id)?;
        Ok(Checklist { root, details })
    }

    /// List the audit history recorded for a checklist.
    ///
    /// # Errors
    ///
    /// Validation, `EntityNotFound`, or `EntityDoesNotBelongToUser`.
    pub fn history(&self, ctx: &RequestContext, id: &str, limit: Option<u32>) -> Result<Vec<Event>> {
        let root = self.fetch_checked(Operation::ReadById, ctx, Some(id), None)?;
        self.store.list_events(&root.id, limit)
    }

    /// Create a checklist aggregate: the root plus the flattened detail
    /// tree, inserted inside one transaction.
    ///
    /// # Errors
    ///
    /// Validation errors before any write; `RepoProblem` if the
    /// transaction fails.
    pub fn create(&mut self, ctx: &RequestContext, input: &NewChecklist) -> Result<Checklist> {
        Self::request_is_valid(Operation::Create, ctx, None, Some(input))?;

        let root = ChecklistRoot::new(&ctx.user_id, &input.title);
        let details = tree::flatten_new(&input.details, &root.id, None, root.created_at);

        self.commit("create_checklist", ctx, |tx, mctx| {
            tx.insert_root(&root)?;
            // Each row already carries its pre-resolved parent id, so
            // insert order among siblings is insignificant.
            for detail in &details {
                tx.insert_detail(detail)?;
            }
            mctx.record_event("checklist", &root.id, EventType::ChecklistCreated);
            Ok(())
        })?;

        Ok(Checklist { root, details })
    }

    /// Apply a change set to an existing checklist.
    ///
    /// Reconciliation happens against the stored flat detail list before
    /// the transaction opens: unknown delete/update targets reject the
    /// whole request, deletions expand to full subtrees, and deletion
    /// wins over update for a detail present in both sets.
    ///
    /// # Errors
    ///
    /// Validation, `EntityNotFound`, `EntityDoesNotBelongToUser`,
    /// `DetailsToDeleteNotFound`, `DetailsToUpdateNotFound` — all before
    /// any write; `RepoProblem` if the transaction fails.
    pub fn update(
        &mut self,
        ctx: &RequestContext,
        id: &str,
        changes: &ChecklistChanges,
    ) -> Result<UpdateSummary> {
        let root = self.fetch_checked(Operation::Update, ctx, Some(id), Some(changes))?;

        // The authoritative current flat list.
        let current = self.store.get_details(&root.id)?;
        let known: HashSet<&str> = current.iter().map(|d| d.id.as_str()).collect();

        // Every explicitly requested deletion must name a stored detail.
        let missing: Vec<String> = changes
            .details_to_delete
            .iter()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(Error::DetailsToDeleteNotFound { missing });
        }

        // Expand to whole subtrees.
        let deleted = tree::descendants_to_remove(&current, &changes.details_to_delete);
        let deleted_set: HashSet<&str> = deleted.iter().map(String::as_str).collect();

        // Every update target must name a stored detail.
        let missing: Vec<String> = changes
            .details_to_update
            .iter()
            .filter(|p| !known.contains(p.id.as_str()))
            .map(|p| p.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(Error::DetailsToUpdateNotFound { missing });
        }

        // Deletion wins over update.
        let patches: Vec<_> = changes
            .details_to_update
            .iter()
            .filter(|p| !deleted_set.contains(p.id.as_str()))
            .collect();

        let now = now_millis();
        let added = tree::flatten_new(&changes.details_to_add, &root.id, None, now);

        self.commit("update_checklist", ctx, |tx, mctx| {
            tx.update_root(&root.id, &changes.title, now)?;
            for id in &deleted {
                tx.delete_detail(id)?;
                mctx.record_event("detail", id, EventType::DetailRemoved);
            }
            for patch in &patches {
                tx.update_detail(&patch.id, &patch.task, patch.done, now)?;
                mctx.record_event("detail", &patch.id, EventType::DetailUpdated);
            }
            for detail in &added {
                tx.insert_detail(detail)?;
                mctx.record_event("detail", &detail.id, EventType::DetailAdded);
            }
            mctx.record_event("checklist", &root.id, EventType::ChecklistUpdated);
            Ok(())
        })?;

        Ok(UpdateSummary {
            root: ChecklistRoot {
                title: changes.title.clone(),
                updated_at: Some(now),
                ..root
            },
            added,
            updated: patches.iter().map(|p| p.id.clone()).collect(),
            deleted,
        })
    }

    /// Delete a checklist aggregate: every detail row, then the root,
    /// inside one transaction.
    ///
    /// # Errors
    ///
    /// Validation, `EntityNotFound`, or `EntityDoesNotBelongToUser`
    /// before any write; `RepoProblem` if the transaction fails.
    pub fn delete_by_id(&mut self, ctx: &RequestContext, id: &str) -> Result<()> {
        let root = self.fetch_checked(Operation::Delete, ctx, Some(id), None)?;

        self.commit("delete_checklist", ctx, |tx, mctx| {
            tx.delete_details_of(&root.id)?;
            tx.delete_root(&root.id)?;
            mctx.record_event("checklist", &root.id, EventType::ChecklistDeleted);
            Ok(())
        })
    }

    /// Run one transactional block; on any failure, the store has rolled
    /// back and only `RepoProblem` crosses the boundary.
    fn commit<R>(
        &mut self,
        op: &'static str,
        ctx: &RequestContext,
        f: impl FnOnce(
            &mut dyn crate::storage::ChecklistTx,
            &mut crate::storage::MutationContext,
        ) -> Result<R>,
    ) -> Result<R> {
        self.store.mutate(op, &ctx.user_id, f).map_err(|e| {
            tracing::error!(op, error = %e, "transaction failed, rolled back");
            Error::RepoProblem
        })
    }
}
