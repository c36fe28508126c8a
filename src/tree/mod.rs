//! Tree⇄list conversion for checklist details.
//!
//! Storage holds details as a flat parent-pointer list (an arena keyed by
//! generated id); clients see a nested tree. This module owns the two
//! inverse transformations plus the descendant closure used when deleting
//! subtrees. Everything here is pure: no I/O, no clock, no storage.

use crate::model::{ChecklistDetail, DetailNode, new_detail_id};
use std::collections::{HashMap, HashSet, VecDeque};

/// Flatten a detail forest into its stored parent-pointer list, preserving
/// ids.
///
/// Pre-order depth-first: each node is emitted (children cleared,
/// `checklist_id` stamped, `parent_detail_id` set to `parent_id`) followed
/// immediately by its flattened descendants, then the next sibling. Empty
/// input yields an empty list.
#[must_use]
pub fn flatten(
    forest: &[ChecklistDetail],
    checklist_id: &str,
    parent_id: Option<&str>,
) -> Vec<ChecklistDetail> {
    let mut out = Vec::new();
    for node in forest {
        let mut flat = node.clone();
        flat.children = Vec::new();
        flat.checklist_id = checklist_id.to_string();
        flat.parent_detail_id = parent_id.map(str::to_string);
        let id = flat.id.clone();
        out.push(flat);
        out.extend(flatten(&node.children, checklist_id, Some(&id)));
    }
    out
}

/// Flatten a brand-new subtree forest, generating identity as it goes.
///
/// Same traversal as [`flatten`], but over id-less input nodes: every
/// emitted detail gets a fresh generated id, `created_at = now`, and no
/// modification timestamp — these nodes have no prior stored identity.
/// Children are linked to their parent's *generated* id, so the emitted
/// rows can be inserted in any order.
#[must_use]
pub fn flatten_new(
    forest: &[DetailNode],
    checklist_id: &str,
    parent_id: Option<&str>,
    now: i64,
) -> Vec<ChecklistDetail> {
    let mut out = Vec::new();
    for node in forest {
        let detail = ChecklistDetail {
            id: new_detail_id(),
            checklist_id: checklist_id.to_string(),
            parent_detail_id: parent_id.map(str::to_string),
            task: node.task.clone(),
            done: node.done,
            created_at: now,
            updated_at: None,
            children: Vec::new(),
        };
        let id = detail.id.clone();
        out.push(detail);
        out.extend(flatten_new(&node.children, checklist_id, Some(&id), now));
    }
    out
}

/// Rebuild the nested tree view from a flat parent-pointer list.
///
/// Selects the entries whose `parent_detail_id` equals `parent_id` (in
/// list order) and recursively fills each one's `children`. The exact
/// structural inverse of [`flatten`] for well-formed input. Empty input
/// yields an empty list.
#[must_use]
pub fn assemble(flat: &[ChecklistDetail], parent_id: Option<&str>) -> Vec<ChecklistDetail> {
    flat.iter()
        .filter(|d| d.parent_detail_id.as_deref() == parent_id)
        .map(|d| {
            let mut node = d.clone();
            node.children = assemble(flat, Some(&d.id));
            node
        })
        .collect()
}

/// Expand a set of detail ids into the full set of rows to remove:
/// the ids themselves plus every descendant reachable downward through
/// `parent_detail_id` links, deduplicated.
///
/// Removing a node always removes its whole subtree; anything less would
/// leave orphaned children behind. Input ids come first in the result,
/// discovered descendants follow in traversal order. An empty `flat` list
/// returns the input ids unchanged — there is nothing to expand against.
#[must_use]
pub fn descendants_to_remove(flat: &[ChecklistDetail], ids: &[String]) -> Vec<String> {
    if flat.is_empty() {
        return ids.to_vec();
    }

    let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
    for detail in flat {
        if let Some(parent) = detail.parent_detail_id.as_deref() {
            children_of.entry(parent).or_default().push(&detail.id);
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for id in ids {
        if seen.insert(id) {
            out.push(id.clone());
            queue.push_back(id);
        }
    }

    while let Some(id) = queue.pop_front() {
        if let Some(children) = children_of.get(id) {
            for &child in children {
                if seen.insert(child) {
                    out.push(child.to_string());
                    queue.push_back(child);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, parent: Option<&str>, task: &str) -> ChecklistDetail {
        ChecklistDetail {
            id: id.to_string(),
            checklist_id: "chk_1".to_string(),
            parent_detail_id: parent.map(str::to_string),
            task: task.to_string(),
            done: false,
            created_at: 1,
            updated_at: None,
            children: Vec::new(),
        }
    }

    fn with_children(mut d: ChecklistDetail, children: Vec<ChecklistDetail>) -> ChecklistDetail {
        d.children = children;
        d
    }

    #[test]
    fn test_flatten_preorder() {
        // [A{children:[B]}, C] flattens to [A, B, C] in that exact order.
        let forest = vec![
            with_children(detail("a", None, "A"), vec![detail("b", None, "B")]),
            detail("c", None, "C"),
        ];

        let flat = flatten(&forest, "chk_1", None);
        let ids: Vec<&str> = flat.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(flat[0].parent_detail_id, None);
        assert_eq!(flat[1].parent_detail_id.as_deref(), Some("a"));
        assert_eq!(flat[2].parent_detail_id, None);
        assert!(flat.iter().all(|d| d.children.is_empty()));
        assert!(flat.iter().all(|d| d.checklist_id == "chk_1"));
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&[], "chk_1", None).is_empty());
    }

    #[test]
    fn test_assemble_empty() {
        assert!(assemble(&[], None).is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let forest = vec![
            with_children(
                detail("a", None, "A"),
                vec![
                    detail("b", None, "B"),
                    with_children(detail("c", None, "C"), vec![detail("d", None, "D")]),
                ],
            ),
            detail("e", None, "E"),
        ];

        let flat = flatten(&forest, "chk_1", None);
        let rebuilt = assemble(&flat, None);

        // Same shape, same ids, same order.
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].id, "a");
        assert_eq!(rebuilt[0].children.len(), 2);
        assert_eq!(rebuilt[0].children[0].id, "b");
        assert_eq!(rebuilt[0].children[1].id, "c");
        assert_eq!(rebuilt[0].children[1].children[0].id, "d");
        assert_eq!(rebuilt[1].id, "e");
        assert!(rebuilt[1].children.is_empty());
    }

    #[test]
    fn test_flatten_new_generates_identity() {
        let forest = vec![DetailNode {
            task: "Buy eggs".to_string(),
            done: false,
            children: vec![DetailNode {
                task: "Buy brown eggs".to_string(),
                done: true,
                children: Vec::new(),
            }],
        }];

        let flat = flatten_new(&forest, "chk_9", None, 42);
        assert_eq!(flat.len(), 2);
        assert!(flat[0].id.starts_with("itm_"));
        assert_ne!(flat[0].id, flat[1].id);
        // Child points at the parent's freshly generated id.
        assert_eq!(flat[1].parent_detail_id.as_deref(), Some(flat[0].id.as_str()));
        assert!(flat.iter().all(|d| d.checklist_id == "chk_9"));
        assert!(flat.iter().all(|d| d.created_at == 42));
        assert!(flat.iter().all(|d| d.updated_at.is_none()));
        assert!(flat[1].done);
    }

    #[test]
    fn test_flatten_new_empty() {
        assert!(flatten_new(&[], "chk_1", None, 0).is_empty());
    }

    #[test]
    fn test_descendant_closure() {
        // 1 is a root; 4 under 1; 6 under 4; 8 under 6; 7 under 4.
        let flat = vec![
            detail("1", None, "root"),
            detail("4", Some("1"), "a"),
            detail("6", Some("4"), "b"),
            detail("8", Some("6"), "c"),
            detail("7", Some("4"), "d"),
        ];

        let removed = descendants_to_remove(&flat, &["4".to_string()]);
        let set: HashSet<&str> = removed.iter().map(String::as_str).collect();
        assert_eq!(set, HashSet::from(["4", "6", "7", "8"]));
        // The requested id leads.
        assert_eq!(removed[0], "4");
    }

    #[test]
    fn test_descendant_closure_empty_flat_passes_input_through() {
        let ids = vec!["x".to_string(), "y".to_string()];
        assert_eq!(descendants_to_remove(&[], &ids), ids);
    }

    #[test]
    fn test_descendant_closure_dedupes_overlapping_requests() {
        let flat = vec![
            detail("a", None, "A"),
            detail("b", Some("a"), "B"),
            detail("c", Some("b"), "C"),
        ];

        // Asking for a parent and one of its descendants must not
        // duplicate the shared subtree.
        let removed = descendants_to_remove(&flat, &["a".to_string(), "b".to_string()]);
        assert_eq!(removed.len(), 3);
        let set: HashSet<&str> = removed.iter().map(String::as_str).collect();
        assert_eq!(set, HashSet::from(["a", "b", "c"]));
    }

    #[test]
    fn test_descendant_closure_unknown_id_stays_in_result() {
        // Membership of the requested ids is the caller's concern; the
        // resolver only expands.
        let flat = vec![detail("a", None, "A")];
        let removed = descendants_to_remove(&flat, &["ghost".to_string()]);
        assert_eq!(removed, vec!["ghost".to_string()]);
    }
}
