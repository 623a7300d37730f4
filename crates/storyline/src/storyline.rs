//! Main Storyline struct and public API.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{Result, StorylineError};
use crate::graph::{order_tables, CompositeKeyMode, DependencyGraph, GraphConfig, TableDependencies, TableOrder};
use crate::introspect::{RowCounter, SchemaIntrospector, SqliteIntrospector};
use crate::schema::{schema_fingerprint, TableInfo};
use crate::semantics::{analyze_columns, analyze_table_semantics, TableSemantics};
use crate::store::{Regeneration, SystemStore};
use crate::story::{
    self, story_progress, NewStoryStep, StepProgress, StepStatus, StepUpdate, StoryProgress,
    StoryStep,
};

/// Configuration for story generation.
#[derive(Debug, Clone)]
pub struct StorylineConfig {
    /// Dependency graph construction options.
    pub graph: GraphConfig,
    /// Threshold given to generated steps.
    pub min_records_required: u64,
}

impl Default for StorylineConfig {
    fn default() -> Self {
        Self {
            graph: GraphConfig::default(),
            min_records_required: 1,
        }
    }
}

impl StorylineConfig {
    /// Set the graph options.
    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    /// Set how composite foreign keys contribute edges.
    pub fn with_composite_keys(mut self, mode: CompositeKeyMode) -> Self {
        self.graph.composite_keys = mode;
        self
    }

    /// Set the threshold for generated steps.
    pub fn with_min_records(mut self, min_records: u64) -> Self {
        self.min_records_required = min_records;
        self
    }
}

/// Story mode over one target database.
///
/// Owns the target introspector and the system store; nothing is shared
/// through global state.
pub struct Storyline<S = SqliteIntrospector> {
    config: StorylineConfig,
    target: S,
    store: SystemStore,
}

impl Storyline<SqliteIntrospector> {
    /// Open a target database read-only together with its system database.
    pub fn open(target: impl AsRef<Path>, system: impl AsRef<Path>) -> Result<Self> {
        let target = SqliteIntrospector::open(target)?;
        let store = SystemStore::open(system)?;
        Ok(Self::new(target, store))
    }
}

impl<S: SchemaIntrospector + RowCounter> Storyline<S> {
    /// Create a Storyline instance with default configuration.
    pub fn new(target: S, store: SystemStore) -> Self {
        Self {
            config: StorylineConfig::default(),
            target,
            store,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: StorylineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StorylineConfig {
        &self.config
    }

    /// The target database.
    pub fn target(&self) -> &S {
        &self.target
    }

    /// The system database.
    pub fn store(&self) -> &SystemStore {
        &self.store
    }

    /// Re-introspect the target and replace cached metadata and semantics.
    pub fn refresh_metadata(&mut self) -> Result<Vec<TableInfo>> {
        let tables = self.target.introspect_all()?;
        let semantics = semantics_of(&tables);

        self.store.replace_table_metadata(&tables)?;
        self.store.replace_column_semantics(&semantics)?;

        debug!(tables = tables.len(), "refreshed metadata cache");
        Ok(tables)
    }

    /// Graph over the cached metadata snapshot.
    pub fn dependency_graph(&self) -> Result<DependencyGraph> {
        let tables = self.store.cached_metadata()?;
        Ok(DependencyGraph::build_with(&tables, &self.config.graph))
    }

    /// Tables from most fundamental to most dependent.
    pub fn table_order(&self) -> Result<TableOrder> {
        Ok(order_tables(&self.dependency_graph()?))
    }

    /// What a table references and what references it.
    pub fn table_dependencies(&self, table: &str) -> Result<TableDependencies> {
        Ok(self.dependency_graph()?.table_dependencies(table))
    }

    /// Semantics of a table, classified from a live introspection.
    pub fn table_semantics(&self, table: &str) -> Result<TableSemantics> {
        analyze_table_semantics(&self.target, table)
    }

    /// Semantics of a table as last cached.
    pub fn cached_semantics(&self, table: &str) -> Result<TableSemantics> {
        self.store.table_semantics(table)
    }

    /// Default steps for the cached snapshot, without storing them.
    pub fn generate_default_steps(&self) -> Result<Vec<NewStoryStep>> {
        let graph = self.dependency_graph()?;
        Ok(story::generate_default_steps(
            &graph,
            self.config.min_records_required,
        ))
    }

    /// Rebuild the whole story from the live schema.
    ///
    /// Metadata, semantics, dependency edges and steps are replaced in one
    /// transaction. Manual step edits are discarded.
    pub fn reset_story(&mut self) -> Result<Vec<StoryStep>> {
        let tables = self.target.introspect_all()?;
        let graph = DependencyGraph::build_with(&tables, &self.config.graph);

        let regeneration = Regeneration {
            semantics: semantics_of(&tables),
            dependencies: graph.edges().to_vec(),
            steps: story::generate_default_steps(&graph, self.config.min_records_required),
            fingerprint: schema_fingerprint(&tables),
            tables,
        };

        self.store.apply_regeneration(&regeneration)
    }

    /// Replace the steps with defaults for the cached snapshot.
    ///
    /// Metadata and edges are left as cached. Manual step edits are discarded.
    pub fn regenerate_story_steps(&mut self) -> Result<Vec<StoryStep>> {
        let tables = self.store.cached_metadata()?;
        let graph = DependencyGraph::build_with(&tables, &self.config.graph);
        let steps = story::generate_default_steps(&graph, self.config.min_records_required);
        let fingerprint = schema_fingerprint(&tables);

        self.store
            .replace_story_steps(&steps, Some(fingerprint.as_str()))
    }

    /// Reset the story if no steps exist yet. Returns whether it did.
    pub fn initialize_story(&mut self) -> Result<bool> {
        if self.store.step_count()? > 0 {
            return Ok(false);
        }
        let steps = self.reset_story()?;
        info!(steps = steps.len(), "initialized story");
        Ok(true)
    }

    /// Stored steps ordered by `order_index`.
    pub fn story_steps(&self, include_disabled: bool) -> Result<Vec<StoryStep>> {
        self.store.story_steps(include_disabled)
    }

    /// One stored step.
    pub fn story_step(&self, id: i64) -> Result<StoryStep> {
        self.store
            .story_step(id)?
            .ok_or(StorylineError::StepNotFound(id))
    }

    /// Apply a sparse edit and return the edited step.
    pub fn update_step(&mut self, id: i64, update: &StepUpdate) -> Result<StoryStep> {
        if !self.store.update_story_step(id, update)? {
            return Err(StorylineError::StepNotFound(id));
        }
        self.story_step(id)
    }

    /// Put steps in the given order; every id must exist.
    pub fn reorder_steps(&mut self, ids: &[i64]) -> Result<()> {
        for &id in ids {
            self.story_step(id)?;
        }
        self.store.reorder_story_steps(ids)
    }

    /// Progress of one step against the live target.
    pub fn step_progress(&self, step: &StoryStep) -> StepProgress {
        story::step_progress(step, &self.target)
    }

    /// Progress over all enabled steps.
    pub fn story_progress(&self) -> Result<StoryProgress> {
        let steps = self.store.story_steps(false)?;
        Ok(story_progress(&steps, &self.target))
    }

    /// The first enabled step that is not complete.
    pub fn current_step(&self) -> Result<Option<StepStatus>> {
        Ok(self.story_progress()?.current_step().cloned())
    }

    /// Whether the live schema differs from the one the steps came from.
    ///
    /// A story that was never generated is stale.
    pub fn is_story_stale(&self) -> Result<bool> {
        let stored = match self.store.story_fingerprint()? {
            Some(fingerprint) => fingerprint,
            None => return Ok(true),
        };
        let live = schema_fingerprint(&self.target.introspect_all()?);
        Ok(stored != live)
    }
}

fn semantics_of(tables: &[TableInfo]) -> IndexMap<String, TableSemantics> {
    tables
        .iter()
        .map(|t| (t.name.clone(), analyze_columns(&t.columns)))
        .collect()
}
