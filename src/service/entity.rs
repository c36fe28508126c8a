//! Generic entity service skeleton.
//!
//! Every entity type shares the same request discipline: an
//! operation-keyed, ordered list of validation rules evaluated
//! first-failure-wins, then a load, then an ownership check. Entity
//! services implement [`EntityService`] with their own rule tables and
//! loader; the provided methods supply the shared behavior.
//!
//! Rule order is a behavioral contract, not an implementation detail:
//! callers depend on the most specific error surfacing first (e.g. a
//! missing id is reported before missing input on Update).

use crate::error::{Error, Result};

/// The operations an entity service validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    ReadById,
    Update,
    Delete,
}

/// Per-call request context.
///
/// Caller identity and ownership enforcement travel with every call
/// instead of living as mutable service state, so one service value can
/// serve any number of callers without a race.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The calling user's id.
    pub user_id: String,

    /// When false, ownership checks pass unconditionally.
    pub enforce_ownership: bool,
}

impl RequestContext {
    /// Context for a normal caller; ownership is enforced.
    #[must_use]
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            enforce_ownership: true,
        }
    }

    /// Context with ownership enforcement disabled (admin/maintenance).
    #[must_use]
    pub fn without_ownership_check(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            enforce_ownership: false,
        }
    }

    /// Ownership predicate: true when enforcement is off or the entity's
    /// owner is the caller.
    #[must_use]
    pub fn belongs_to_user(&self, owner_id: &str) -> bool {
        !self.enforce_ownership || owner_id == self.user_id
    }
}

/// View of a request input that validation rules can inspect without
/// knowing the concrete input type.
pub trait ValidatedInput {
    /// The input's title field, when it has one.
    fn title(&self) -> Option<&str> {
        None
    }
}

/// An entity owned by a user.
pub trait OwnedEntity {
    fn owner_id(&self) -> &str;
}

/// One validation rule: a predicate plus the error it raises.
pub struct Rule {
    /// Returns true when the request passes this rule.
    pub check: fn(&RequestContext, Option<&str>, Option<&dyn ValidatedInput>) -> bool,
    /// Constructs the error reported when the predicate fails.
    pub fail: fn() -> Error,
}

// ── Shared predicates ─────────────────────────────────────────

/// The request carries an input payload.
#[must_use]
pub fn has_input(
    _ctx: &RequestContext,
    _id: Option<&str>,
    input: Option<&dyn ValidatedInput>,
) -> bool {
    input.is_some()
}

/// The request names an entity id.
#[must_use]
pub fn has_id(_ctx: &RequestContext, id: Option<&str>, _input: Option<&dyn ValidatedInput>) -> bool {
    id.is_some_and(|id| !id.is_empty())
}

/// The caller supplied a user id.
#[must_use]
pub fn has_user(
    ctx: &RequestContext,
    _id: Option<&str>,
    _input: Option<&dyn ValidatedInput>,
) -> bool {
    !ctx.user_id.is_empty()
}

/// The input carries a non-blank title.
#[must_use]
pub fn has_title(
    _ctx: &RequestContext,
    _id: Option<&str>,
    input: Option<&dyn ValidatedInput>,
) -> bool {
    input
        .and_then(ValidatedInput::title)
        .is_some_and(|t| !t.trim().is_empty())
}

/// The shared service skeleton.
pub trait EntityService {
    /// The entity this service manages.
    type Entity: OwnedEntity;

    /// The ordered rule table registered for an operation.
    fn rules(op: Operation) -> &'static [Rule];

    /// Load an entity by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn load(&self, id: &str) -> Result<Option<Self::Entity>>;

    /// Evaluate the rules registered for `op`, in registration order,
    /// returning the first failure.
    ///
    /// # Errors
    ///
    /// `IncorrectInputData` when no rules are registered for the
    /// operation; otherwise the failing rule's error.
    fn request_is_valid(
        op: Operation,
        ctx: &RequestContext,
        id: Option<&str>,
        input: Option<&dyn ValidatedInput>,
    ) -> Result<()> {
        let rules = Self::rules(op);
        if rules.is_empty() {
            return Err(Error::IncorrectInputData);
        }
        for rule in rules {
            if !(rule.check)(ctx, id, input) {
                return Err((rule.fail)());
            }
        }
        Ok(())
    }

    /// Validate, load, and ownership-check in one step.
    ///
    /// # Errors
    ///
    /// The failing rule's error; `EntityNotFound` when no entity has the
    /// id; `EntityDoesNotBelongToUser` when it exists but is owned by
    /// someone else and enforcement is on. The two are distinct outcomes.
    fn fetch_checked(
        &self,
        op: Operation,
        ctx: &RequestContext,
        id: Option<&str>,
        input: Option<&dyn ValidatedInput>,
    ) -> Result<Self::Entity> {
        Self::request_is_valid(op, ctx, id, input)?;
        let Some(id) = id else {
            return Err(Error::IncorrectInputData);
        };
        let entity = self
            .load(id)?
            .ok_or_else(|| Error::EntityNotFound { id: id.to_string() })?;
        if !ctx.belongs_to_user(entity.owner_id()) {
            return Err(Error::EntityDoesNotBelongToUser { id: id.to_string() });
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Note {
        owner: String,
    }

    impl OwnedEntity for Note {
        fn owner_id(&self) -> &str {
            &self.owner
        }
    }

    /// Minimal service: one stored note, rules only for ReadById.
    struct NoteService {
        note_id: String,
        note_owner: String,
    }

    fn missing_input() -> Error {
        Error::IncorrectInputData
    }

    fn missing_user() -> Error {
        Error::UserIdNotSupplied
    }

    const READ_RULES: &[Rule] = &[
        Rule { check: has_id, fail: missing_input },
        Rule { check: has_user, fail: missing_user },
    ];

    impl EntityService for NoteService {
        type Entity = Note;

        fn rules(op: Operation) -> &'static [Rule] {
            match op {
                Operation::ReadById => READ_RULES,
                // No rules registered for the rest.
                Operation::Create | Operation::Update | Operation::Delete => &[],
            }
        }

        fn load(&self, id: &str) -> Result<Option<Note>> {
            Ok((id == self.note_id).then(|| Note {
                owner: self.note_owner.clone(),
            }))
        }
    }

    fn service() -> NoteService {
        NoteService {
            note_id: "note_1".to_string(),
            note_owner: "user_1".to_string(),
        }
    }

    #[test]
    fn test_unregistered_operation_is_incorrect_input() {
        let ctx = RequestContext::new("user_1");
        let err = NoteService::request_is_valid(Operation::Create, &ctx, None, None).unwrap_err();
        assert!(matches!(err, Error::IncorrectInputData));
    }

    #[test]
    fn test_rules_run_in_registration_order() {
        // Both id and user are missing; the id rule is registered first
        // and must win.
        let ctx = RequestContext::new("");
        let err =
            NoteService::request_is_valid(Operation::ReadById, &ctx, None, None).unwrap_err();
        assert!(matches!(err, Error::IncorrectInputData));

        // With an id present, the user rule surfaces.
        let err = NoteService::request_is_valid(Operation::ReadById, &ctx, Some("note_1"), None)
            .unwrap_err();
        assert!(matches!(err, Error::UserIdNotSupplied));
    }

    #[test]
    fn test_not_found_and_not_owned_are_distinct() {
        let svc = service();

        let ctx = RequestContext::new("user_2");
        let err = svc
            .fetch_checked(Operation::ReadById, &ctx, Some("note_9"), None)
            .unwrap_err();
        assert!(matches!(err, Error::EntityNotFound { .. }));

        let err = svc
            .fetch_checked(Operation::ReadById, &ctx, Some("note_1"), None)
            .unwrap_err();
        assert!(matches!(err, Error::EntityDoesNotBelongToUser { .. }));
    }

    #[test]
    fn test_ownership_check_can_be_disabled() {
        let svc = service();
        let ctx = RequestContext::without_ownership_check("user_2");
        assert!(svc
            .fetch_checked(Operation::ReadById, &ctx, Some("note_1"), None)
            .is_ok());
    }
}
