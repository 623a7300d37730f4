//! Turn a table ordering into default story steps.

use tracing::debug;

use crate::graph::{topological_sort_tables, DependencyGraph};

use super::step::{NewStoryStep, SourceType};

/// Human-readable title for a table name.
///
/// Underscores become spaces. A cased letter following anything other
/// than a cased letter is upper-cased and every other cased letter
/// lower-cased, so `order_items` reads "Order Items" and `SKU2code` reads
/// "Sku2Code". Uncased characters (digits, punctuation, CJK) pass through
/// and start a new word.
pub fn title_case(name: &str) -> String {
    let mut title = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_lowercase() || c.is_uppercase() {
            if in_word {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            title.push(c);
            in_word = false;
        }
    }

    title
}

/// Describe a table's place in the graph from its degrees.
pub fn describe(in_degree: usize, out_degree: usize) -> String {
    match (out_degree, in_degree) {
        (0, 0) => "This is a standalone table with no foreign key relationships.".to_string(),
        (0, dependents) => format!("This is a root table. {} other table(s) depend on it.", dependents),
        (references, 0) => format!("This table references {} other table(s).", references),
        (references, dependents) => format!(
            "This table references {} table(s) and is referenced by {} table(s).",
            references, dependents
        ),
    }
}

/// One enabled table step per entry of `order`, indexed by position.
pub fn materialize_steps(
    order: &[String],
    graph: &DependencyGraph,
    min_records: u64,
) -> Vec<NewStoryStep> {
    order
        .iter()
        .enumerate()
        .map(|(index, table)| NewStoryStep {
            source_type: SourceType::Table,
            source_name: table.clone(),
            order_index: index as i64,
            title: title_case(table),
            description: describe(graph.in_degree(table), graph.out_degree(table)),
            min_records_required: min_records,
            enabled: true,
        })
        .collect()
}

/// Sort the graph and materialize the result.
pub fn generate_default_steps(graph: &DependencyGraph, min_records: u64) -> Vec<NewStoryStep> {
    let order = topological_sort_tables(graph);
    let steps = materialize_steps(&order, graph, min_records);
    debug!(steps = steps.len(), "generated default story steps");
    steps
}
