//! Order command - tables from most fundamental to most dependent.

use colored::Colorize;
use storyline::order_tables;

use super::{open_refreshed, CommandResult};
use crate::cli::TargetArgs;

pub fn run(target: TargetArgs, json_output: bool) -> CommandResult {
    let storyline = open_refreshed(&target)?;
    let graph = storyline.dependency_graph()?;
    let order = order_tables(&graph);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(());
    }

    println!("{}", "Table order".cyan().bold());
    println!();

    for (i, table) in order.tables.iter().enumerate() {
        let dependents = graph.in_degree(table);
        if order.unresolved.contains(table) {
            println!("  {:>3}. {} {}", i + 1, table.red(), "(unresolved)".red());
        } else {
            println!("  {:>3}. {} {}", i + 1, table, format!("({} dependents)", dependents).dimmed());
        }
    }

    if order.has_cycles() {
        println!();
        println!("{} {}", "Warning:".yellow().bold(), unresolved_warning(order.unresolved.len()));
    }

    Ok(())
}

fn unresolved_warning(count: usize) -> String {
    format!(
        "{} table(s) could not be ordered (cycle, self reference, or depending on one) and were appended in discovery order",
        count
    )
}
