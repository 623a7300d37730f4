//! Foreign-key dependency graph and table ordering.

mod dependency;
mod sequencer;

pub use dependency::{CompositeKeyMode, Dependency, DependencyGraph, GraphConfig, TableDependencies};
pub use sequencer::{order_tables, topological_sort_tables, TableOrder};
