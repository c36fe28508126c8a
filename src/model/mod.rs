//! Data models for TickList.
//!
//! This module contains the checklist aggregate and its input/result
//! shapes:
//! - `ChecklistRoot` / `ChecklistDetail` (flat stored form, derived tree form)
//! - `NewChecklist` / `DetailNode` (Create input)
//! - `ChecklistChanges` / `DetailPatch` (Update input)
//! - `Checklist` / `UpdateSummary` (results)

pub mod checklist;

pub use checklist::{
    Checklist, ChecklistChanges, ChecklistDetail, ChecklistRoot, DetailNode, DetailPatch,
    NewChecklist, UpdateSummary, new_checklist_id, new_detail_id, now_millis,
};
