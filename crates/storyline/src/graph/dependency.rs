//! Directed table dependency graph built from foreign keys.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{ForeignKeyInfo, TableInfo};

/// How composite foreign keys contribute edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKeyMode {
    /// One edge per foreign-key descriptor row (a two-column key adds
    /// two edges to the same table).
    #[default]
    PerColumnPair,
    /// One edge per constraint id.
    PerConstraint,
}

/// Graph construction options.
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Edge counting for composite keys.
    pub composite_keys: CompositeKeyMode,
}

impl GraphConfig {
    /// Set the composite key mode.
    pub fn with_composite_keys(mut self, mode: CompositeKeyMode) -> Self {
        self.composite_keys = mode;
        self
    }
}

/// "`from_table` references `to_table`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from_table: String,
    pub to_table: String,
    pub from_column: String,
    #[serde(default)]
    pub to_column: Option<String>,
}

impl Dependency {
    /// Edge between two tables without column information.
    pub fn new(from_table: impl Into<String>, to_table: impl Into<String>) -> Self {
        Self {
            from_table: from_table.into(),
            to_table: to_table.into(),
            from_column: String::new(),
            to_column: None,
        }
    }

    fn from_foreign_key(table: &str, fk: &ForeignKeyInfo) -> Self {
        Self {
            from_table: table.to_string(),
            to_table: fk.referenced_table.clone(),
            from_column: fk.from_column.clone(),
            to_column: fk.to_column.clone(),
        }
    }
}

/// What one table references and what references it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDependencies {
    pub depends_on: Vec<String>,
    pub depended_by: Vec<String>,
}

/// Foreign-key graph over all tables of a snapshot.
///
/// Nodes iterate in insertion order: snapshot tables first, then tables
/// known only as reference targets, in order of first mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    nodes: IndexSet<String>,
    edges: Vec<Dependency>,
    outgoing: IndexMap<String, Vec<String>>,
    incoming: IndexMap<String, Vec<String>>,
    in_degree: IndexMap<String, usize>,
    out_degree: IndexMap<String, usize>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a metadata snapshot with default options.
    pub fn build(tables: &[TableInfo]) -> Self {
        Self::build_with(tables, &GraphConfig::default())
    }

    /// Build a graph from a metadata snapshot.
    ///
    /// Every table is a node even without foreign keys. A reference to a
    /// table missing from the snapshot still adds that table as a node.
    pub fn build_with(tables: &[TableInfo], config: &GraphConfig) -> Self {
        let mut graph = Self::new();

        for table in tables {
            graph.add_table(&table.name);

            let mut seen_constraints = HashSet::new();
            for fk in &table.foreign_keys {
                if fk.referenced_table.is_empty() {
                    continue;
                }
                if config.composite_keys == CompositeKeyMode::PerConstraint
                    && !seen_constraints.insert(fk.constraint_id)
                {
                    continue;
                }
                graph.add_dependency(Dependency::from_foreign_key(&table.name, fk));
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built dependency graph"
        );

        graph
    }

    /// Add a node; a no-op when the table is already present.
    pub fn add_table(&mut self, table: &str) {
        if self.nodes.insert(table.to_string()) {
            self.outgoing.entry(table.to_string()).or_default();
            self.incoming.entry(table.to_string()).or_default();
            self.in_degree.entry(table.to_string()).or_insert(0);
            self.out_degree.entry(table.to_string()).or_insert(0);
        }
    }

    /// Add an edge, creating either endpoint as needed.
    ///
    /// Returns false (and adds nothing) when the target table is empty.
    /// Self references are kept and count toward both degrees.
    pub fn add_dependency(&mut self, dependency: Dependency) -> bool {
        if dependency.to_table.is_empty() {
            return false;
        }

        self.add_table(&dependency.from_table);
        self.add_table(&dependency.to_table);

        if let Some(targets) = self.outgoing.get_mut(&dependency.from_table) {
            targets.push(dependency.to_table.clone());
        }
        if let Some(sources) = self.incoming.get_mut(&dependency.to_table) {
            sources.push(dependency.from_table.clone());
        }
        if let Some(out) = self.out_degree.get_mut(&dependency.from_table) {
            *out += 1;
        }
        if let Some(inc) = self.in_degree.get_mut(&dependency.to_table) {
            *inc += 1;
        }

        self.edges.push(dependency);
        true
    }

    /// All tables, in insertion order.
    pub fn nodes(&self) -> &IndexSet<String> {
        &self.nodes
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Dependency] {
        &self.edges
    }

    /// Edges as (from_table, to_table) pairs.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|e| (e.from_table.as_str(), e.to_table.as_str()))
    }

    /// Tables referenced by `table`, one entry per edge.
    pub fn depends_on(&self, table: &str) -> &[String] {
        self.outgoing.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tables referencing `table`, one entry per edge.
    pub fn depended_by(&self, table: &str) -> &[String] {
        self.incoming.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of incoming edges.
    pub fn in_degree(&self, table: &str) -> usize {
        self.in_degree.get(table).copied().unwrap_or(0)
    }

    /// Number of outgoing edges.
    pub fn out_degree(&self, table: &str) -> usize {
        self.out_degree.get(table).copied().unwrap_or(0)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.nodes.contains(table)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Tables that reference nothing.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|t| self.out_degree(t) == 0)
            .map(String::as_str)
            .collect()
    }

    /// Tables nothing references.
    pub fn leaves(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|t| self.in_degree(t) == 0)
            .map(String::as_str)
            .collect()
    }

    /// Both adjacency lists of one table.
    pub fn table_dependencies(&self, table: &str) -> TableDependencies {
        TableDependencies {
            depends_on: self.depends_on(table).to_vec(),
            depended_by: self.depended_by(table).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Vec<TableInfo> {
        vec![
            TableInfo::new("categories"),
            TableInfo::new("order_items")
                .references("products", "product_id")
                .references("orders", "order_id"),
            TableInfo::new("orders").references("users", "user_id"),
            TableInfo::new("products").references("categories", "category_id"),
        ]
    }

    #[test]
    fn test_isolated_tables_are_nodes() {
        let graph = DependencyGraph::build(&[TableInfo::new("settings")]);
        assert!(graph.contains("settings"));
        assert_eq!(graph.in_degree("settings"), 0);
        assert_eq!(graph.out_degree("settings"), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edges_and_adjacency() {
        let graph = DependencyGraph::build(&shop());

        let pairs: Vec<_> = graph.edge_pairs().collect();
        assert_eq!(
            pairs,
            vec![
                ("order_items", "products"),
                ("order_items", "orders"),
                ("orders", "users"),
                ("products", "categories"),
            ]
        );
        assert_eq!(graph.depends_on("order_items"), ["products", "orders"]);
        assert_eq!(graph.depended_by("categories"), ["products"]);
        assert_eq!(graph.out_degree("order_items"), 2);
        assert_eq!(graph.in_degree("order_items"), 0);
    }

    #[test]
    fn test_dangling_reference_becomes_node() {
        let graph = DependencyGraph::build(&shop());

        assert!(graph.contains("users"));
        assert_eq!(graph.in_degree("users"), 1);
        assert_eq!(graph.out_degree("users"), 0);
        assert!(graph.depends_on("users").is_empty());
    }

    #[test]
    fn test_node_order_is_insertion_order() {
        let graph = DependencyGraph::build(&shop());
        let nodes: Vec<_> = graph.nodes().iter().map(String::as_str).collect();
        assert_eq!(nodes, vec!["categories", "order_items", "products", "orders", "users"]);
    }

    #[test]
    fn test_self_reference_counts_both_ways() {
        let graph = DependencyGraph::build(&[
            TableInfo::new("employees").references("employees", "manager_id"),
        ]);
        assert_eq!(graph.in_degree("employees"), 1);
        assert_eq!(graph.out_degree("employees"), 1);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_empty_target_is_ignored() {
        let mut graph = DependencyGraph::new();
        assert!(!graph.add_dependency(Dependency::new("a", "")));
        assert_eq!(graph.node_count(), 0);

        let table = TableInfo::new("a").references("", "x");
        let graph = DependencyGraph::build(&[table]);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_composite_key_modes_are_distinguishable() {
        let table = TableInfo::new("enrollments")
            .with_foreign_key(ForeignKeyInfo::new(0, "courses", "course_code", Some("code")))
            .with_foreign_key(
                ForeignKeyInfo::new(0, "courses", "course_term", Some("term")).with_sequence(1),
            )
            .with_foreign_key(ForeignKeyInfo::new(1, "students", "student_id", None));
        let tables = vec![table, TableInfo::new("courses"), TableInfo::new("students")];

        let per_pair = DependencyGraph::build(&tables);
        assert_eq!(per_pair.edge_count(), 3);
        assert_eq!(per_pair.in_degree("courses"), 2);
        assert_eq!(per_pair.out_degree("enrollments"), 3);

        let per_constraint = DependencyGraph::build_with(
            &tables,
            &GraphConfig::default().with_composite_keys(CompositeKeyMode::PerConstraint),
        );
        assert_eq!(per_constraint.edge_count(), 2);
        assert_eq!(per_constraint.in_degree("courses"), 1);
        assert_eq!(per_constraint.out_degree("enrollments"), 2);
    }

    #[test]
    fn test_roots_and_leaves() {
        let graph = DependencyGraph::build(&shop());
        assert_eq!(graph.roots(), vec!["categories", "users"]);
        assert_eq!(graph.leaves(), vec!["order_items"]);
    }

    #[test]
    fn test_table_dependencies() {
        let graph = DependencyGraph::build(&shop());
        let deps = graph.table_dependencies("orders");
        assert_eq!(deps.depends_on, vec!["users"]);
        assert_eq!(deps.depended_by, vec!["order_items"]);

        assert_eq!(graph.table_dependencies("nope"), TableDependencies::default());
    }
}
