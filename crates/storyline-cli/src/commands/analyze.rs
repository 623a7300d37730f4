//! Analyze command - one-screen summary of a target database.

use std::collections::HashSet;

use colored::Colorize;
use storyline::order_tables;

use super::{open, CommandResult};
use crate::cli::TargetArgs;

pub fn run(target: TargetArgs, json_output: bool) -> CommandResult {
    let mut storyline = open(&target)?;
    let tables = storyline.refresh_metadata()?;
    let graph = storyline.dependency_graph()?;
    let order = order_tables(&graph);
    let semantics = storyline.store().all_semantics()?;

    let known: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let dangling: Vec<&str> = graph
        .nodes()
        .iter()
        .map(String::as_str)
        .filter(|t| !known.contains(t))
        .collect();

    if json_output {
        let summary = serde_json::json!({
            "database": target.db.display().to_string(),
            "tables": tables.iter().map(|t| serde_json::json!({
                "name": t.name,
                "columns": t.columns.len(),
                "foreign_keys": t.foreign_keys.len(),
                "row_count": t.row_count,
            })).collect::<Vec<_>>(),
            "edges": graph.edge_count(),
            "dangling": dangling,
            "order": order.tables,
            "unresolved": order.unresolved,
            "semantics": semantics,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Schema analysis for".cyan().bold(),
        target.db.display().to_string().white()
    );
    println!();

    println!("{}", "Tables:".yellow().bold());
    for table in &tables {
        println!(
            "  {:<28} {:>3} columns  {:>2} foreign keys  {:>8} rows",
            table.name.white(),
            table.columns.len(),
            table.foreign_keys.len(),
            table.row_count
        );
    }
    for table in &dangling {
        println!("  {:<28} {}", table.white(), "(referenced, not in database)".red());
    }
    println!();

    println!(
        "{} {} nodes, {} edges",
        "Dependencies:".yellow().bold(),
        graph.node_count(),
        graph.edge_count()
    );
    println!();

    println!("{}", "Suggested order:".yellow().bold());
    for (i, table) in order.tables.iter().enumerate() {
        let marker = if order.unresolved.contains(table) {
            " (unresolved)".red().to_string()
        } else {
            String::new()
        };
        println!("  {:>2}. {}{}", i + 1, table, marker);
    }
    println!();

    println!("{}", "Semantic columns:".yellow().bold());
    if semantics.is_empty() {
        println!("  {}", "none detected".dimmed());
    }
    for (table, mapping) in &semantics {
        let columns: Vec<String> = mapping
            .iter()
            .map(|(column, role)| format!("{} ({})", column, role.to_string().green()))
            .collect();
        println!("  {}: {}", table.white().bold(), columns.join(", "));
    }

    Ok(())
}
