//! Storyline CLI - guided data entry for SQLite databases.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, StoryCommand};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze { target, json } => commands::analyze::run(target, json),

        Commands::Graph { target, json } => commands::graph::run(target, json),

        Commands::Order { target, json } => commands::order::run(target, json),

        Commands::Semantics { db, table, json } => commands::semantics::run(db, table, json),

        Commands::Story { action } => match action {
            StoryCommand::Reset { target, json } => commands::story::reset(target, json),
            StoryCommand::Status { target, all, json } => {
                commands::story::status(target, all, json)
            }
            StoryCommand::Edit {
                target,
                id,
                title,
                description,
                min_records,
                enabled,
                order_index,
            } => {
                let update = storyline::StepUpdate {
                    title,
                    description,
                    min_records_required: min_records,
                    enabled,
                    order_index,
                };
                commands::story::edit(target, id, update)
            }
            StoryCommand::Reorder { target, ids } => commands::story::reorder(target, ids),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
