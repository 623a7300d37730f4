//! Degree-biased topological ordering of tables.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dependency::DependencyGraph;

/// Result of ordering a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOrder {
    /// Every node exactly once, referenced tables before referencing ones.
    pub tables: Vec<String>,
    /// Tables that could not be scheduled because they sit on (or behind)
    /// a reference cycle. They are the tail of `tables`, in node order.
    pub unresolved: Vec<String>,
}

impl TableOrder {
    pub fn has_cycles(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Work queue entry: most-referenced first, then first enqueued.
#[derive(Debug, PartialEq, Eq)]
struct Pending<'a> {
    in_degree: usize,
    seq: usize,
    table: &'a str,
}

impl Ord for Pending<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.in_degree
            .cmp(&other.in_degree)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Order tables from most fundamental to most dependent.
///
/// See [`order_tables`] for the scheduling rules.
pub fn topological_sort_tables(graph: &DependencyGraph) -> Vec<String> {
    order_tables(graph).tables
}

/// Kahn-style ordering with an in-degree tie-break.
///
/// Tables referencing nothing are eligible first. Once every table a
/// dependent references has been placed, the dependent becomes eligible.
/// Among eligible tables the one referenced by the most others goes next;
/// equal in-degrees go in the order they became eligible (node order for
/// the initial set). Tables never reaching eligibility (cycles, including
/// self references, and everything depending on them) are appended in
/// node order.
pub fn order_tables(graph: &DependencyGraph) -> TableOrder {
    let total = graph.node_count();
    let mut visited: HashSet<&str> = HashSet::with_capacity(total);
    let mut tables = Vec::with_capacity(total);
    let mut queue = BinaryHeap::new();
    let mut seq = 0;

    for table in graph.nodes() {
        if graph.out_degree(table) == 0 {
            queue.push(Pending {
                in_degree: graph.in_degree(table),
                seq,
                table: table.as_str(),
            });
            seq += 1;
        }
    }

    while let Some(Pending { table, .. }) = queue.pop() {
        // a dependent may be enqueued once per edge into it
        if !visited.insert(table) {
            continue;
        }
        tables.push(table.to_string());

        for dependent in graph.depended_by(table) {
            if visited.contains(dependent.as_str()) {
                continue;
            }
            let ready = graph
                .depends_on(dependent)
                .iter()
                .all(|d| visited.contains(d.as_str()));
            if ready {
                queue.push(Pending {
                    in_degree: graph.in_degree(dependent),
                    seq,
                    table: dependent.as_str(),
                });
                seq += 1;
            }
        }
    }

    let unresolved: Vec<String> = graph
        .nodes()
        .iter()
        .filter(|t| !visited.contains(t.as_str()))
        .cloned()
        .collect();
    tables.extend(unresolved.iter().cloned());

    debug!(
        tables = tables.len(),
        unresolved = unresolved.len(),
        "ordered tables"
    );

    TableOrder { tables, unresolved }
}
