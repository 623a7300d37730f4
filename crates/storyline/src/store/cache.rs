//! Cached schema metadata, column semantics and dependency edges.

use indexmap::IndexMap;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::{Result, StorylineError};
use crate::graph::Dependency;
use crate::schema::TableInfo;
use crate::semantics::{SemanticRole, TableSemantics};

use super::{from_count, to_count, SystemStore};

impl SystemStore {
    /// Replace the metadata cache with a fresh snapshot.
    pub fn replace_table_metadata(&mut self, tables: &[TableInfo]) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_table_metadata(&tx, tables)?;
        tx.commit()?;
        Ok(())
    }

    /// The cached snapshot, ordered by table name.
    pub fn cached_metadata(&self) -> Result<Vec<TableInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name, row_count, columns_json, foreign_keys_json
             FROM table_metadata ORDER BY table_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(name, row_count, columns_json, foreign_keys_json)| -> Result<TableInfo> {
                let columns = serde_json::from_str(&columns_json).map_err(|e| {
                    StorylineError::Persistence(format!(
                        "Failed to parse cached columns of '{}': {}",
                        name, e
                    ))
                })?;
                let foreign_keys = serde_json::from_str(&foreign_keys_json).map_err(|e| {
                    StorylineError::Persistence(format!(
                        "Failed to parse cached foreign keys of '{}': {}",
                        name, e
                    ))
                })?;
                Ok(TableInfo {
                    name,
                    columns,
                    foreign_keys,
                    row_count: to_count(row_count.unwrap_or(0)),
                })
            })
            .collect()
    }

    /// Drop cached metadata and semantics.
    pub fn clear_metadata_cache(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM table_metadata", [])?;
        tx.execute("DELETE FROM column_semantics", [])?;
        tx.commit()?;
        debug!("cleared metadata cache");
        Ok(())
    }

    /// Replace all cached column semantics.
    pub fn replace_column_semantics(
        &mut self,
        semantics: &IndexMap<String, TableSemantics>,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_column_semantics(&tx, semantics)?;
        tx.commit()?;
        Ok(())
    }

    /// Cached semantics of one table; empty when nothing is cached.
    pub fn table_semantics(&self, table: &str) -> Result<TableSemantics> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name, semantic_type FROM column_semantics
             WHERE table_name = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![table], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(column, role)| -> Result<(String, SemanticRole)> {
                Ok((column, role.parse()?))
            })
            .collect()
    }

    /// Cached semantics of every table, ordered by table name.
    pub fn all_semantics(&self) -> Result<IndexMap<String, TableSemantics>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name, column_name, semantic_type FROM column_semantics
             ORDER BY table_name, id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut all: IndexMap<String, TableSemantics> = IndexMap::new();
        for (table, column, role) in rows {
            let role = role.parse::<SemanticRole>()?;
            all.entry(table).or_default().insert(column, role);
        }
        Ok(all)
    }

    /// Replace the persisted edge list.
    pub fn replace_dependencies(&mut self, dependencies: &[Dependency]) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_dependencies(&tx, dependencies)?;
        tx.commit()?;
        Ok(())
    }

    /// Persisted edges in insertion order.
    ///
    /// Edges between the same pair of tables are stored once, keeping the
    /// columns of the first.
    pub fn cached_dependencies(&self) -> Result<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_table, to_table, from_column, to_column
             FROM table_dependencies ORDER BY id",
        )?;
        let dependencies = stmt
            .query_map([], |row| {
                Ok(Dependency {
                    from_table: row.get(0)?,
                    to_table: row.get(1)?,
                    from_column: row.get(2)?,
                    to_column: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(dependencies)
    }
}

pub(super) fn write_table_metadata(conn: &Connection, tables: &[TableInfo]) -> Result<()> {
    conn.execute("DELETE FROM table_metadata", [])?;

    let mut stmt = conn.prepare(
        "INSERT INTO table_metadata (table_name, row_count, columns_json, foreign_keys_json)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for table in tables {
        stmt.execute(params![
            table.name,
            from_count(table.row_count),
            serde_json::to_string(&table.columns)?,
            serde_json::to_string(&table.foreign_keys)?,
        ])?;
    }

    debug!(tables = tables.len(), "cached table metadata");
    Ok(())
}

pub(super) fn write_column_semantics(
    conn: &Connection,
    semantics: &IndexMap<String, TableSemantics>,
) -> Result<()> {
    conn.execute("DELETE FROM column_semantics", [])?;

    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO column_semantics (table_name, column_name, semantic_type)
         VALUES (?1, ?2, ?3)",
    )?;
    let mut columns = 0;
    for (table, mapping) in semantics {
        for (column, role) in mapping.iter() {
            stmt.execute(params![table, column, role.as_str()])?;
            columns += 1;
        }
    }

    debug!(columns, "cached column semantics");
    Ok(())
}

pub(super) fn write_dependencies(conn: &Connection, dependencies: &[Dependency]) -> Result<()> {
    conn.execute("DELETE FROM table_dependencies", [])?;

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO table_dependencies (from_table, to_table, from_column, to_column)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut stored = 0;
    for dep in dependencies {
        stored += stmt.execute(params![
            dep.from_table,
            dep.to_table,
            dep.from_column,
            dep.to_column,
        ])?;
    }

    debug!(edges = dependencies.len(), stored, "cached dependency edges");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnInfo, ForeignKeyInfo};

    fn snapshot() -> Vec<TableInfo> {
        let mut products = TableInfo::new("products")
            .with_column(ColumnInfo::new(0, "id", "INTEGER").primary_key())
            .with_column(ColumnInfo::new(1, "category_id", "INTEGER"))
            .references("categories", "category_id");
        products.row_count = 12;
        vec![
            TableInfo::new("categories").with_column(ColumnInfo::new(0, "id", "INTEGER")),
            products,
        ]
    }

    #[test]
    fn test_metadata_roundtrip_is_ordered_by_name() {
        let mut store = SystemStore::open_in_memory().unwrap();
        let mut tables = snapshot();
        tables.reverse();
        store.replace_table_metadata(&tables).unwrap();

        let cached = store.cached_metadata().unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].name, "categories");
        assert_eq!(cached[1], snapshot()[1]);
    }

    #[test]
    fn test_replace_metadata_discards_previous_snapshot() {
        let mut store = SystemStore::open_in_memory().unwrap();
        store.replace_table_metadata(&snapshot()).unwrap();
        store
            .replace_table_metadata(&[TableInfo::new("only")])
            .unwrap();

        let names: Vec<_> = store
            .cached_metadata()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["only"]);
    }

    #[test]
    fn test_semantics_roundtrip() {
        let mut store = SystemStore::open_in_memory().unwrap();
        let mut tasks = TableSemantics::new();
        tasks.insert("updated_at", SemanticRole::UpdatedAt);
        tasks.insert("created_at", SemanticRole::CreatedAt);
        let mut all = IndexMap::new();
        all.insert("tasks".to_string(), tasks.clone());
        all.insert("empty".to_string(), TableSemantics::new());

        store.replace_column_semantics(&all).unwrap();

        assert_eq!(store.table_semantics("tasks").unwrap(), tasks);
        assert!(store.table_semantics("missing").unwrap().is_empty());

        let cached = store.all_semantics().unwrap();
        assert_eq!(cached.len(), 1);
        let columns: Vec<_> = cached["tasks"].iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["updated_at", "created_at"]);
    }

    #[test]
    fn test_clear_metadata_cache() {
        let mut store = SystemStore::open_in_memory().unwrap();
        store.replace_table_metadata(&snapshot()).unwrap();
        let mut all: IndexMap<String, TableSemantics> = IndexMap::new();
        all.insert(
            "tasks".to_string(),
            [("status".to_string(), SemanticRole::Status)].into_iter().collect(),
        );
        store.replace_column_semantics(&all).unwrap();

        store.clear_metadata_cache().unwrap();
        assert!(store.cached_metadata().unwrap().is_empty());
        assert!(store.all_semantics().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let mut store = SystemStore::open_in_memory().unwrap();
        let composite = TableInfo::new("enrollments")
            .with_foreign_key(ForeignKeyInfo::new(0, "courses", "course_code", Some("code")))
            .with_foreign_key(
                ForeignKeyInfo::new(0, "courses", "course_term", Some("term")).with_sequence(1),
            );
        let graph = crate::graph::DependencyGraph::build(&[composite]);
        assert_eq!(graph.edge_count(), 2);

        store.replace_dependencies(graph.edges()).unwrap();
        let cached = store.cached_dependencies().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].from_column, "course_code");
        assert_eq!(cached[0].to_column.as_deref(), Some("code"));
    }

    #[test]
    fn test_corrupt_metadata_is_a_persistence_error() {
        let store = SystemStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO table_metadata (table_name, columns_json) VALUES ('t', 'not json')",
                [],
            )
            .unwrap();

        let err = store.cached_metadata().unwrap_err();
        assert!(matches!(err, StorylineError::Persistence(_)));
    }
}
