//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// TickList - notes and hierarchical checklists backend
#[derive(Parser, Debug)]
#[command(name = "tick", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.ticklist/ticklist.db)
    #[arg(long, global = true, env = "TICK_DB")]
    pub db: Option<PathBuf>,

    /// Calling user id
    #[arg(long, global = true, env = "TICK_USER")]
    pub user: Option<String>,

    /// Skip ownership checks (maintenance access to any user's data)
    #[arg(long, global = true, hide = true)]
    pub no_ownership_check: bool,

    /// Output as JSON (for agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the TickList database
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Print version information
    Version,

    /// Checklist management
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// Create a checklist, optionally with a detail tree
    Create(CreateArgs),

    /// List your checklists
    List,

    /// Show one checklist as a tree (or flat with --flat)
    Show {
        /// Checklist id
        id: String,

        /// Print the stored flat rows instead of the tree
        #[arg(long)]
        flat: bool,
    },

    /// Apply a change set to a checklist
    Update(UpdateArgs),

    /// Delete a checklist and all of its details
    Delete {
        /// Checklist id
        id: String,
    },

    /// Show the audit history of a checklist
    History {
        /// Checklist id
        id: String,

        /// Maximum number of events
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Checklist title
    pub title: String,

    /// Detail tree as JSON: [{"task": "...", "done": false, "children": [...]}]
    #[arg(long)]
    pub details: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Checklist id
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: String,

    /// Subtrees to add, as JSON (same shape as create --details)
    #[arg(long)]
    pub add: Option<String>,

    /// Patches to existing details, as JSON:
    /// [{"id": "itm_...", "task": "...", "done": true}]
    #[arg(long = "set")]
    pub set: Option<String>,

    /// Detail id to delete, whole subtree included (repeatable)
    #[arg(long = "delete")]
    pub delete: Vec<String>,
}
