//! Graph command - foreign-key dependency graph.

use colored::Colorize;

use super::{open_refreshed, CommandResult};
use crate::cli::TargetArgs;

pub fn run(target: TargetArgs, json_output: bool) -> CommandResult {
    let storyline = open_refreshed(&target)?;
    let graph = storyline.dependency_graph()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!(
        "{} ({} tables, {} dependencies)",
        "Dependency graph".cyan().bold(),
        graph.node_count(),
        graph.edge_count()
    );
    println!();

    println!("{}", "Tables:".yellow().bold());
    for table in graph.nodes() {
        let depends_on = graph.depends_on(table);
        let line = format!(
            "  {:<28} in {:>2}  out {:>2}",
            table,
            graph.in_degree(table),
            graph.out_degree(table)
        );
        if depends_on.is_empty() {
            println!("{}", line.green());
        } else {
            println!("{}  -> {}", line, depends_on.join(", ").dimmed());
        }
    }

    if graph.edge_count() > 0 {
        println!();
        println!("{}", "Edges:".yellow().bold());
        for dependency in graph.edges() {
            let column = if dependency.from_column.is_empty() {
                String::new()
            } else {
                format!(".{}", dependency.from_column)
            };
            println!(
                "  {}{} -> {}",
                dependency.from_table,
                column.dimmed(),
                dependency.to_table
            );
        }
    }

    Ok(())
}
