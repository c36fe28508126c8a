//! Checklist aggregate model.
//!
//! A checklist is a root entity (title, owner, timestamps) owning a tree of
//! details. Storage always holds the *flat* parent-pointer form; the nested
//! tree form is derived on demand and never persisted.

use serde::{Deserialize, Serialize};

/// Generate a checklist root id (`chk_` + 12 hex chars).
#[must_use]
pub fn new_checklist_id() -> String {
    format!("chk_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Generate a checklist detail id (`itm_` + 12 hex chars).
#[must_use]
pub fn new_detail_id() -> String {
    format!("itm_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Current time as Unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The checklist aggregate's top-level entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistRoot {
    /// Unique identifier (server-generated, stable).
    pub id: String,

    /// Owning user id.
    pub user_id: String,

    /// Checklist title (non-empty).
    pub title: String,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last modification timestamp (Unix milliseconds).
    pub updated_at: Option<i64>,
}

impl ChecklistRoot {
    /// Create a new root with a generated id and creation timestamp.
    #[must_use]
    pub fn new(user_id: &str, title: &str) -> Self {
        Self {
            id: new_checklist_id(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: now_millis(),
            updated_at: None,
        }
    }
}

/// One hierarchical item belonging to a checklist.
///
/// `children` exists only for the derived tree representation: it is
/// skipped by serde when empty and always empty in the flat (stored)
/// form. `checklist_id` always equals the owning root's id, and
/// `parent_detail_id`, when set, names another detail of the same
/// checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistDetail {
    /// Unique identifier (server-generated, stable).
    pub id: String,

    /// Owning checklist id.
    pub checklist_id: String,

    /// Parent detail id; `None` for top-level details.
    pub parent_detail_id: Option<String>,

    /// Task name (non-empty).
    pub task: String,

    /// Completion flag.
    pub done: bool,

    /// Creation timestamp (Unix milliseconds).
    pub created_at: i64,

    /// Last modification timestamp (Unix milliseconds).
    pub updated_at: Option<i64>,

    /// Transient nested children. Never persisted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChecklistDetail>,
}

/// A client-supplied brand-new detail subtree node.
///
/// Carries no id: ids are always server-generated when the subtree is
/// flattened for insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailNode {
    /// Task name.
    pub task: String,

    /// Completion flag.
    #[serde(default)]
    pub done: bool,

    /// Nested child nodes.
    #[serde(default)]
    pub children: Vec<DetailNode>,
}

/// Create input: a title plus an optional brand-new detail forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub title: String,

    #[serde(default)]
    pub details: Vec<DetailNode>,
}

/// The mutable fields of one existing detail, keyed by id.
///
/// `checklist_id` and `parent_detail_id` are immutable and therefore
/// absent: an update never re-parents a detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailPatch {
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub done: bool,
}

/// Update input: new root fields plus three independent change sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistChanges {
    pub title: String,

    /// Brand-new subtrees, attached at the checklist's top level.
    #[serde(default)]
    pub details_to_add: Vec<DetailNode>,

    /// In-place patches to existing details.
    #[serde(default)]
    pub details_to_update: Vec<DetailPatch>,

    /// Ids of details to remove; each removal takes its whole subtree.
    #[serde(default)]
    pub details_to_delete: Vec<String>,
}

/// The checklist aggregate: root plus flat detail rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub root: ChecklistRoot,

    /// Details in flat parent-pointer form, insertion order.
    pub details: Vec<ChecklistDetail>,
}

impl Checklist {
    /// Derive the nested tree view of the details.
    #[must_use]
    pub fn tree(&self) -> Vec<ChecklistDetail> {
        crate::tree::assemble(&self.details, None)
    }
}

/// Change summary returned by Update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub root: ChecklistRoot,

    /// Newly inserted details (flat, generated ids).
    pub added: Vec<ChecklistDetail>,

    /// Ids of details patched in place.
    pub updated: Vec<String>,

    /// Ids actually deleted, including expanded descendants.
    pub deleted: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_root() {
        let root = ChecklistRoot::new("user_1", "Groceries");
        assert!(root.id.starts_with("chk_"));
        assert_eq!(root.id.len(), "chk_".len() + 12);
        assert_eq!(root.user_id, "user_1");
        assert_eq!(root.title, "Groceries");
        assert!(root.updated_at.is_none());
    }

    #[test]
    fn test_detail_ids_are_unique() {
        let a = new_detail_id();
        let b = new_detail_id();
        assert!(a.starts_with("itm_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_children_skipped_when_empty() {
        let detail = ChecklistDetail {
            id: "itm_1".to_string(),
            checklist_id: "chk_1".to_string(),
            parent_detail_id: None,
            task: "Buy milk".to_string(),
            done: false,
            created_at: 1,
            updated_at: None,
            children: Vec::new(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_detail_node_defaults() {
        let node: DetailNode = serde_json::from_str(r#"{"task": "Buy eggs"}"#).unwrap();
        assert!(!node.done);
        assert!(node.children.is_empty());
    }
}
