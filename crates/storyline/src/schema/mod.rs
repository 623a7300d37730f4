//! Schema descriptor types for introspected tables.

mod column;
mod foreign_key;
mod table;

pub use column::ColumnInfo;
pub use foreign_key::ForeignKeyInfo;
pub use table::{schema_fingerprint, TableInfo};
