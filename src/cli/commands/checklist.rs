//! Checklist management commands.
//!
//! - `tick checklist create <title> [--details <json>]` - Create a checklist
//! - `tick checklist list` - List your checklists
//! - `tick checklist show <id>` - Show one checklist as a tree
//! - `tick checklist update <id> --title <t> [--add] [--set] [--delete]` - Apply changes
//! - `tick checklist delete <id>` - Delete a checklist and its details
//! - `tick checklist history <id>` - Show audit events
//!
//! This is the presentation boundary: the stored flat rows become a tree
//! here (and only here), and service error codes become exit codes in
//! `main`.

use crate::cli::{ChecklistCommands, CreateArgs, UpdateArgs};
use crate::config::{resolve_db_path, resolve_user};
use crate::error::{Error, Result};
use crate::model::{
    Checklist, ChecklistChanges, ChecklistDetail, ChecklistRoot, DetailNode, DetailPatch,
    NewChecklist, UpdateSummary,
};
use crate::service::{ChecklistService, RequestContext};
use crate::storage::{Event, SqliteStore};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct RootOutput {
    id: String,
    title: String,
    user_id: String,
    created_at: String,
    updated_at: Option<String>,
}

impl From<ChecklistRoot> for RootOutput {
    fn from(r: ChecklistRoot) -> Self {
        Self {
            id: r.id,
            title: r.title,
            user_id: r.user_id,
            created_at: format_timestamp(r.created_at),
            updated_at: r.updated_at.map(format_timestamp),
        }
    }
}

#[derive(Serialize)]
struct ChecklistOutput {
    root: RootOutput,
    details: Vec<ChecklistDetail>,
}

#[derive(Serialize)]
struct ListOutput {
    checklists: Vec<RootOutput>,
    count: usize,
}

#[derive(Serialize)]
struct SummaryOutput {
    root: RootOutput,
    added: usize,
    updated: usize,
    deleted: usize,
}

impl From<UpdateSummary> for SummaryOutput {
    fn from(s: UpdateSummary) -> Self {
        Self {
            root: RootOutput::from(s.root),
            added: s.added.len(),
            updated: s.updated.len(),
            deleted: s.deleted.len(),
        }
    }
}

#[derive(Serialize)]
struct EventOutput {
    event: &'static str,
    entity_type: String,
    entity_id: String,
    actor: String,
    at: String,
}

impl From<Event> for EventOutput {
    fn from(e: Event) -> Self {
        Self {
            event: e.event_type.as_str(),
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            actor: e.actor,
            at: format_timestamp(e.created_at),
        }
    }
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

/// Execute a checklist command.
pub fn execute(
    command: &ChecklistCommands,
    db_path: Option<&PathBuf>,
    user: Option<&str>,
    no_ownership_check: bool,
    json: bool,
) -> Result<()> {
    let db_path =
        resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let store = SqliteStore::open(&db_path)?;
    let mut service = ChecklistService::new(store);

    let user = resolve_user(user);
    let ctx = if no_ownership_check {
        RequestContext::without_ownership_check(&user)
    } else {
        RequestContext::new(&user)
    };

    match command {
        ChecklistCommands::Create(args) => execute_create(&mut service, &ctx, args, json),
        ChecklistCommands::List => execute_list(&service, &ctx, json),
        ChecklistCommands::Show { id, flat } => execute_show(&service, &ctx, id, *flat, json),
        ChecklistCommands::Update(args) => execute_update(&mut service, &ctx, args, json),
        ChecklistCommands::Delete { id } => execute_delete(&mut service, &ctx, id, json),
        ChecklistCommands::History { id, limit } => {
            execute_history(&service, &ctx, id, *limit, json)
        }
    }
}

fn parse_details(json: Option<&str>) -> Result<Vec<DetailNode>> {
    match json {
        Some(payload) => Ok(serde_json::from_str(payload)?),
        None => Ok(Vec::new()),
    }
}

fn parse_patches(json: Option<&str>) -> Result<Vec<DetailPatch>> {
    match json {
        Some(payload) => Ok(serde_json::from_str(payload)?),
        None => Ok(Vec::new()),
    }
}

fn execute_create(
    service: &mut ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    args: &CreateArgs,
    json: bool,
) -> Result<()> {
    let input = NewChecklist {
        title: args.title.clone(),
        details: parse_details(args.details.as_deref())?,
    };

    let created = service.create(ctx, &input)?;

    if json {
        let output = ChecklistOutput {
            root: RootOutput::from(created.root.clone()),
            details: created.details.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Created checklist: {}", created.root.title);
        println!("  ID:      {}", created.root.id);
        println!("  Details: {}", created.details.len());
    }

    Ok(())
}

fn execute_list(
    service: &ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    json: bool,
) -> Result<()> {
    let roots = service.list_for_user(ctx)?;

    if json {
        let output = ListOutput {
            count: roots.len(),
            checklists: roots.into_iter().map(RootOutput::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if roots.is_empty() {
        println!("No checklists found.");
        println!("\nCreate one with: tick checklist create \"Checklist Title\"");
    } else {
        println!("Checklists ({}):\n", roots.len());
        for root in roots {
            println!("  {} [{}]", root.title.bold(), root.id);
        }
    }

    Ok(())
}

fn execute_show(
    service: &ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    id: &str,
    flat: bool,
    json: bool,
) -> Result<()> {
    let checklist = service.get_by_id(ctx, id)?;

    if json {
        if flat {
            let output = ChecklistOutput {
                root: RootOutput::from(checklist.root.clone()),
                details: checklist.details.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            let output = ChecklistOutput {
                root: RootOutput::from(checklist.root.clone()),
                details: checklist.tree(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        return Ok(());
    }

    print_root_header(&checklist);

    if flat {
        for detail in &checklist.details {
            let parent = detail.parent_detail_id.as_deref().unwrap_or("-");
            println!(
                "  {} {}  [{}] parent={}",
                done_mark(detail.done),
                detail.task,
                detail.id,
                parent
            );
        }
    } else {
        print_detail_forest(&checklist.tree(), 1);
    }

    Ok(())
}

fn print_root_header(checklist: &Checklist) {
    println!("{} [{}]", checklist.root.title.bold(), checklist.root.id);
    if checklist.details.is_empty() {
        println!("  (no details)");
    }
}

fn done_mark(done: bool) -> colored::ColoredString {
    if done { "✓".green() } else { "○".normal() }
}

fn print_detail_forest(forest: &[ChecklistDetail], depth: usize) {
    for detail in forest {
        println!(
            "{}{} {}  [{}]",
            "  ".repeat(depth),
            done_mark(detail.done),
            detail.task,
            detail.id
        );
        print_detail_forest(&detail.children, depth + 1);
    }
}

fn execute_update(
    service: &mut ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    args: &UpdateArgs,
    json: bool,
) -> Result<()> {
    let changes = ChecklistChanges {
        title: args.title.clone(),
        details_to_add: parse_details(args.add.as_deref())?,
        details_to_update: parse_patches(args.set.as_deref())?,
        details_to_delete: args.delete.clone(),
    };

    let summary = service.update(ctx, &args.id, &changes)?;

    if json {
        let output = SummaryOutput::from(summary);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Updated checklist: {}", summary.root.title);
        println!("  ID:      {}", summary.root.id);
        println!(
            "  Changes: +{} added, ~{} updated, -{} deleted",
            summary.added.len(),
            summary.updated.len(),
            summary.deleted.len()
        );
    }

    Ok(())
}

fn execute_delete(
    service: &mut ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    id: &str,
    json: bool,
) -> Result<()> {
    service.delete_by_id(ctx, id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted checklist {id}");
    }

    Ok(())
}

fn execute_history(
    service: &ChecklistService<SqliteStore>,
    ctx: &RequestContext,
    id: &str,
    limit: u32,
    json: bool,
) -> Result<()> {
    let events = service.history(ctx, id, Some(limit))?;

    if json {
        let output: Vec<EventOutput> = events.into_iter().map(EventOutput::from).collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if events.is_empty() {
        println!("No events recorded for {id}");
    } else {
        for event in events {
            println!(
                "  {}  {}  by {}",
                format_timestamp(event.created_at),
                event.event_type.as_str(),
                event.actor
            );
        }
    }

    Ok(())
}
