//! Semantics command - inferred column roles, read straight from the target.

use std::path::PathBuf;

use colored::Colorize;
use storyline::semantics::{analyze_table_semantics, TableSemantics};
use storyline::{SchemaIntrospector, SqliteIntrospector};

use super::CommandResult;

pub fn run(db: PathBuf, table: Option<String>, json_output: bool) -> CommandResult {
    let introspector = SqliteIntrospector::open(&db)?;
    let tables = match table {
        Some(table) => vec![table],
        None => introspector.table_names()?,
    };

    let mut by_table: Vec<(String, TableSemantics)> = Vec::new();
    for name in tables {
        let semantics = analyze_table_semantics(&introspector, &name)?;
        by_table.push((name, semantics));
    }

    if json_output {
        let map: serde_json::Map<String, serde_json::Value> = by_table
            .iter()
            .map(|(name, semantics)| Ok((name.clone(), serde_json::to_value(semantics)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Column semantics for".cyan().bold(),
        db.display().to_string().white()
    );
    println!();

    for (name, semantics) in &by_table {
        print_table(name, semantics);
    }

    Ok(())
}

fn print_table(name: &str, semantics: &TableSemantics) {
    println!("{}", name.yellow().bold());
    if semantics.is_empty() {
        println!("  {}", "no recognised columns".dimmed());
    }
    for (column, role) in semantics.iter() {
        println!("  {:<28} {}", column, role.to_string().green());
    }
    if let Some(column) = semantics.soft_delete_column() {
        println!("  {} {}", "soft delete via".dimmed(), column.dimmed());
    }
    println!();
}
