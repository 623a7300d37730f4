//! Persisted story steps and atomic regeneration.

use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StorylineError};
use crate::graph::Dependency;
use crate::schema::TableInfo;
use crate::semantics::TableSemantics;
use crate::story::{NewStoryStep, StepUpdate, StoryStep};

use super::cache::{write_column_semantics, write_dependencies, write_table_metadata};
use super::{from_count, to_count, SystemStore, FINGERPRINT_KEY};

const STEP_COLUMNS: &str = "id, source_type, source_name, order_index, title, description, \
                            min_records_required, enabled";

/// Everything a story reset writes, applied in one transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Regeneration {
    /// Fresh metadata snapshot.
    pub tables: Vec<TableInfo>,
    /// Column semantics per table.
    pub semantics: IndexMap<String, TableSemantics>,
    /// Dependency edges of the snapshot.
    pub dependencies: Vec<Dependency>,
    /// Replacement steps.
    pub steps: Vec<NewStoryStep>,
    /// Schema fingerprint of `tables`.
    pub fingerprint: String,
}

impl SystemStore {
    /// Delete every step and insert `steps` in their place.
    ///
    /// Manual edits to the old steps are lost. When a fingerprint is given
    /// it is recorded in the same transaction.
    pub fn replace_story_steps(
        &mut self,
        steps: &[NewStoryStep],
        fingerprint: Option<&str>,
    ) -> Result<Vec<StoryStep>> {
        let tx = self.conn.transaction()?;
        let stored = write_story_steps(&tx, steps)?;
        if let Some(fingerprint) = fingerprint {
            write_meta(&tx, FINGERPRINT_KEY, fingerprint)?;
        }
        tx.commit()?;
        Ok(stored)
    }

    /// Number of stored steps, enabled or not.
    pub fn step_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM story_steps", [], |row| row.get(0))?;
        Ok(to_count(count) as usize)
    }

    /// Stored steps ordered by `order_index`.
    pub fn story_steps(&self, include_disabled: bool) -> Result<Vec<StoryStep>> {
        let sql = if include_disabled {
            format!("SELECT {} FROM story_steps ORDER BY order_index, id", STEP_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM story_steps WHERE enabled = 1 ORDER BY order_index, id",
                STEP_COLUMNS
            )
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_step_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(StoredStep::into_step).collect()
    }

    /// One stored step.
    pub fn story_step(&self, id: i64) -> Result<Option<StoryStep>> {
        let sql = format!("SELECT {} FROM story_steps WHERE id = ?1", STEP_COLUMNS);
        self.conn
            .query_row(&sql, params![id], read_step_row)
            .optional()?
            .map(StoredStep::into_step)
            .transpose()
    }

    /// Apply a sparse edit. Returns whether the step exists.
    pub fn update_story_step(&mut self, id: i64, update: &StepUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.story_step(id)?.is_some());
        }

        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = &update.title {
            assignments.push("title = ?");
            values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &update.description {
            assignments.push("description = ?");
            values.push(Value::Text(description.clone()));
        }
        if let Some(min_records) = update.min_records_required {
            assignments.push("min_records_required = ?");
            values.push(Value::Integer(from_count(min_records)));
        }
        if let Some(enabled) = update.enabled {
            assignments.push("enabled = ?");
            values.push(Value::Integer(i64::from(enabled)));
        }
        if let Some(order_index) = update.order_index {
            assignments.push("order_index = ?");
            values.push(Value::Integer(order_index));
        }
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE story_steps SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(values))?;

        debug!(id, changed, "updated story step");
        Ok(changed > 0)
    }

    /// Assign `order_index` 0, 1, … following `ids`.
    ///
    /// Steps not listed keep their index; unknown ids are ignored.
    pub fn reorder_story_steps(&mut self, ids: &[i64]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE story_steps SET order_index = ?1 WHERE id = ?2")?;
            for (index, id) in ids.iter().enumerate() {
                stmt.execute(params![index as i64, id])?;
            }
        }
        tx.commit()?;
        debug!(steps = ids.len(), "reordered story steps");
        Ok(())
    }

    /// Fingerprint of the schema the stored steps were generated from.
    pub fn story_fingerprint(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM story_meta WHERE key = ?1",
                params![FINGERPRINT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace cached metadata, semantics, edges and steps at once.
    ///
    /// Either all of it lands or none of it does.
    pub fn apply_regeneration(&mut self, regeneration: &Regeneration) -> Result<Vec<StoryStep>> {
        let tx = self.conn.transaction()?;
        write_table_metadata(&tx, &regeneration.tables)?;
        write_column_semantics(&tx, &regeneration.semantics)?;
        write_dependencies(&tx, &regeneration.dependencies)?;
        let stored = write_story_steps(&tx, &regeneration.steps)?;
        write_meta(&tx, FINGERPRINT_KEY, &regeneration.fingerprint)?;
        tx.commit()?;

        info!(
            tables = regeneration.tables.len(),
            steps = stored.len(),
            "regenerated story"
        );
        Ok(stored)
    }
}

/// Raw `story_steps` row before type conversion.
struct StoredStep {
    id: i64,
    source_type: String,
    source_name: String,
    order_index: i64,
    title: String,
    description: String,
    min_records_required: i64,
    enabled: bool,
}

impl StoredStep {
    fn into_step(self) -> Result<StoryStep> {
        let source_type = self.source_type.parse().map_err(|_| {
            StorylineError::Persistence(format!(
                "Step {} has unknown source type '{}'",
                self.id, self.source_type
            ))
        })?;

        Ok(StoryStep {
            id: self.id,
            source_type,
            source_name: self.source_name,
            order_index: self.order_index,
            title: self.title,
            description: self.description,
            min_records_required: to_count(self.min_records_required),
            enabled: self.enabled,
        })
    }
}

fn read_step_row(row: &Row<'_>) -> rusqlite::Result<StoredStep> {
    Ok(StoredStep {
        id: row.get(0)?,
        source_type: row.get(1)?,
        source_name: row.get(2)?,
        order_index: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        min_records_required: row.get(6)?,
        enabled: row.get::<_, i64>(7)? != 0,
    })
}

fn write_story_steps(conn: &Connection, steps: &[NewStoryStep]) -> Result<Vec<StoryStep>> {
    conn.execute("DELETE FROM story_steps", [])?;

    let mut stmt = conn.prepare(
        "INSERT INTO story_steps
           (source_type, source_name, order_index, title, description, min_records_required, enabled)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    let mut stored = Vec::with_capacity(steps.len());
    for step in steps {
        stmt.execute(params![
            step.source_type.as_str(),
            step.source_name,
            step.order_index,
            step.title,
            step.description,
            from_count(step.min_records_required),
            step.enabled,
        ])?;
        stored.push(step.clone().into_step(conn.last_insert_rowid()));
    }

    debug!(steps = stored.len(), "replaced story steps");
    Ok(stored)
}

fn write_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO story_meta (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::SourceType;

    fn new_step(name: &str, index: i64) -> NewStoryStep {
        NewStoryStep {
            source_type: SourceType::Table,
            source_name: name.to_string(),
            order_index: index,
            title: name.to_string(),
            description: String::new(),
            min_records_required: 1,
            enabled: true,
        }
    }

    fn seeded() -> (SystemStore, Vec<StoryStep>) {
        let mut store = SystemStore::open_in_memory().unwrap();
        let stored = store
            .replace_story_steps(
                &[new_step("users", 0), new_step("orders", 1), new_step("items", 2)],
                None,
            )
            .unwrap();
        (store, stored)
    }

    #[test]
    fn test_replace_assigns_ids() {
        let (store, stored) = seeded();
        assert_eq!(stored.len(), 3);
        assert_eq!(store.step_count().unwrap(), 3);
        assert_eq!(store.story_steps(true).unwrap(), stored);
        assert_eq!(store.story_step(stored[1].id).unwrap(), Some(stored[1].clone()));
        assert_eq!(store.story_step(9999).unwrap(), None);
    }

    #[test]
    fn test_replace_discards_previous_steps() {
        let (mut store, stored) = seeded();
        store.replace_story_steps(&[new_step("only", 0)], None).unwrap();

        assert_eq!(store.step_count().unwrap(), 1);
        assert_eq!(store.story_step(stored[0].id).unwrap(), None);
    }

    #[test]
    fn test_disabled_steps_are_filtered() {
        let (mut store, stored) = seeded();
        let update = StepUpdate::new().with_enabled(false);
        assert!(store.update_story_step(stored[1].id, &update).unwrap());

        let enabled: Vec<_> = store
            .story_steps(false)
            .unwrap()
            .into_iter()
            .map(|s| s.source_name)
            .collect();
        assert_eq!(enabled, vec!["users", "items"]);
        assert_eq!(store.story_steps(true).unwrap().len(), 3);
    }

    #[test]
    fn test_update_story_step() {
        let (mut store, stored) = seeded();
        let id = stored[0].id;
        let update = StepUpdate::new()
            .with_title("People")
            .with_description("Add the people first.")
            .with_min_records(3);

        assert!(store.update_story_step(id, &update).unwrap());

        let mut expected = stored[0].clone();
        update.apply_to(&mut expected);
        assert_eq!(store.story_step(id).unwrap(), Some(expected));
    }

    #[test]
    fn test_update_unknown_step() {
        let (mut store, _) = seeded();
        let update = StepUpdate::new().with_title("x");
        assert!(!store.update_story_step(4242, &update).unwrap());
        assert!(!store.update_story_step(4242, &StepUpdate::new()).unwrap());
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let (mut store, stored) = seeded();
        assert!(store.update_story_step(stored[0].id, &StepUpdate::new()).unwrap());
        assert_eq!(store.story_steps(true).unwrap(), stored);
    }

    #[test]
    fn test_reorder() {
        let (mut store, stored) = seeded();
        let ids = vec![stored[2].id, stored[0].id, stored[1].id];
        store.reorder_story_steps(&ids).unwrap();

        let order: Vec<_> = store
            .story_steps(true)
            .unwrap()
            .into_iter()
            .map(|s| (s.source_name, s.order_index))
            .collect();
        assert_eq!(
            order,
            vec![
                ("items".to_string(), 0),
                ("users".to_string(), 1),
                ("orders".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_fingerprint_recorded_with_steps() {
        let mut store = SystemStore::open_in_memory().unwrap();
        assert_eq!(store.story_fingerprint().unwrap(), None);

        store
            .replace_story_steps(&[new_step("a", 0)], Some("sha256:abc"))
            .unwrap();
        assert_eq!(store.story_fingerprint().unwrap().as_deref(), Some("sha256:abc"));

        store.replace_story_steps(&[], None).unwrap();
        assert_eq!(store.story_fingerprint().unwrap().as_deref(), Some("sha256:abc"));
    }

    #[test]
    fn test_apply_regeneration_writes_everything() {
        let mut store = SystemStore::open_in_memory().unwrap();
        let regeneration = Regeneration {
            tables: vec![TableInfo::new("categories"), TableInfo::new("products")],
            semantics: IndexMap::new(),
            dependencies: vec![Dependency::new("products", "categories")],
            steps: vec![new_step("categories", 0), new_step("products", 1)],
            fingerprint: "sha256:0123".to_string(),
        };

        let stored = store.apply_regeneration(&regeneration).unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(store.cached_metadata().unwrap().len(), 2);
        assert_eq!(store.cached_dependencies().unwrap(), regeneration.dependencies);
        assert_eq!(store.story_fingerprint().unwrap().as_deref(), Some("sha256:0123"));
    }

    #[test]
    fn test_failed_regeneration_leaves_state_untouched() {
        let (mut store, stored) = seeded();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON story_steps
                 WHEN NEW.source_name = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let regeneration = Regeneration {
            tables: vec![TableInfo::new("fresh")],
            steps: vec![new_step("fresh", 0), new_step("bad", 1)],
            fingerprint: "sha256:new".to_string(),
            ..Default::default()
        };

        assert!(store.apply_regeneration(&regeneration).is_err());
        assert_eq!(store.story_steps(true).unwrap(), stored);
        assert!(store.cached_metadata().unwrap().is_empty());
        assert_eq!(store.story_fingerprint().unwrap(), None);
    }

    #[test]
    fn test_unknown_source_type_is_a_persistence_error() {
        let (store, stored) = seeded();
        store
            .conn
            .execute(
                "UPDATE story_steps SET source_type = 'report' WHERE id = ?1",
                params![stored[0].id],
            )
            .unwrap();

        assert!(matches!(
            store.story_step(stored[0].id),
            Err(StorylineError::Persistence(_))
        ));
    }
}
