//! Storyline: guided data entry for SQLite databases.
//!
//! Storyline reads the schema of a target database, works out which tables
//! depend on which through their foreign keys, and turns that into an
//! ordered story: populate the tables everything else references first,
//! then the tables that reference them.
//!
//! # Core Principles
//!
//! - **Read-only target**: the target database is only introspected and counted
//! - **Deterministic**: the same schema always yields the same story
//! - **Fail soft**: cycles, dangling references and dropped tables degrade
//!   the story instead of aborting it
//!
//! # Example
//!
//! ```no_run
//! use storyline::Storyline;
//!
//! let mut storyline = Storyline::open("shop.db", "shop.storyline.db").unwrap();
//! storyline.initialize_story().unwrap();
//!
//! let progress = storyline.story_progress().unwrap();
//! println!("{}% complete", progress.overall_percentage);
//! if let Some(current) = progress.current_step() {
//!     println!("Next: {}", current.step.title);
//! }
//! ```

pub mod error;
pub mod graph;
pub mod introspect;
pub mod schema;
pub mod semantics;
pub mod store;
pub mod story;

mod storyline;

pub use crate::storyline::{Storyline, StorylineConfig};
pub use error::{Result, StorylineError};
pub use graph::{
    order_tables, topological_sort_tables, CompositeKeyMode, Dependency, DependencyGraph,
    GraphConfig, TableOrder,
};
pub use introspect::{RowCounter, SchemaIntrospector, SqliteIntrospector, StaticSchema};
pub use schema::{ColumnInfo, ForeignKeyInfo, TableInfo};
pub use semantics::{detect_semantic_type, SemanticRole, TableSemantics};
pub use store::SystemStore;
pub use story::{SourceType, StepProgress, StepUpdate, StoryProgress, StoryStep};
