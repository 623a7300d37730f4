//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Storyline: guided data entry for SQLite databases
#[derive(Parser)]
#[command(name = "storyline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Target database plus where Storyline keeps its own state.
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Path to the target SQLite database
    #[arg(value_name = "DB")]
    pub db: PathBuf,

    /// System database path (default: <DB stem>.storyline.db beside the target)
    #[arg(long, value_name = "PATH")]
    pub system: Option<PathBuf>,
}

impl TargetArgs {
    /// The system database path, explicit or derived from the target.
    pub fn system_path(&self) -> PathBuf {
        if let Some(system) = &self.system {
            return system.clone();
        }
        let mut path = self.db.clone();
        let stem = self.db.file_stem().unwrap_or_default().to_string_lossy();
        path.set_file_name(format!("{}.storyline.db", stem));
        path
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize tables, dependencies, ordering and column semantics
    Analyze {
        #[command(flatten)]
        target: TargetArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the foreign-key dependency graph
    Graph {
        #[command(flatten)]
        target: TargetArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tables ordered from most fundamental to most dependent
    Order {
        #[command(flatten)]
        target: TargetArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show inferred column semantics
    Semantics {
        /// Path to the target SQLite database
        #[arg(value_name = "DB")]
        db: PathBuf,

        /// Only this table
        #[arg(short, long)]
        table: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the guided data-entry story
    Story {
        #[command(subcommand)]
        action: StoryCommand,
    },
}

#[derive(Subcommand)]
pub enum StoryCommand {
    /// Regenerate all steps from the current schema (discards manual edits)
    Reset {
        #[command(flatten)]
        target: TargetArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show story progress (generates the story on first use)
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Include disabled steps
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit one step
    Edit {
        #[command(flatten)]
        target: TargetArgs,

        /// Step id
        #[arg(value_name = "STEP_ID")]
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Rows required before the step is complete
        #[arg(long)]
        min_records: Option<u64>,

        /// Enable or disable the step
        #[arg(long)]
        enabled: Option<bool>,

        /// New position
        #[arg(long)]
        order_index: Option<i64>,
    },

    /// Reorder steps by listing their ids in the desired order
    Reorder {
        #[command(flatten)]
        target: TargetArgs,

        /// Step ids, first step first
        #[arg(value_name = "STEP_ID", required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_system_path() {
        let target = TargetArgs {
            db: PathBuf::from("/data/shop.db"),
            system: None,
        };
        assert_eq!(target.system_path(), PathBuf::from("/data/shop.storyline.db"));

        let explicit = TargetArgs {
            db: PathBuf::from("shop.db"),
            system: Some(PathBuf::from("state.db")),
        };
        assert_eq!(explicit.system_path(), PathBuf::from("state.db"));
    }

    #[test]
    fn test_parse_story_edit() {
        let cli = Cli::parse_from([
            "storyline", "story", "edit", "shop.db", "3", "--title", "People", "--enabled", "false",
        ]);
        match cli.command {
            Commands::Story {
                action: StoryCommand::Edit { id, title, enabled, min_records, .. },
            } => {
                assert_eq!(id, 3);
                assert_eq!(title.as_deref(), Some("People"));
                assert_eq!(enabled, Some(false));
                assert_eq!(min_records, None);
            }
            _ => panic!("expected story edit"),
        }
    }
}
