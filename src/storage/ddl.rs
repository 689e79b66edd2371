//! DDL statements issued against a [`super::TableSink`].

use crate::layout::ColumnSpec;
use crate::naming::quote_identifier;

/// Table options appended to every `CREATE TABLE`.
pub const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// A schema-changing statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    /// `DROP TABLE IF EXISTS`.
    DropTable { table: String },
    /// `CREATE TABLE IF NOT EXISTS` with the given column definitions.
    CreateTable {
        table: String,
        columns: Vec<ColumnSpec>,
    },
}

impl DdlStatement {
    /// Target table name (unquoted).
    pub fn table(&self) -> &str {
        match self {
            Self::DropTable { table } | Self::CreateTable { table, .. } => table,
        }
    }

    /// Render the MySQL statement text.
    pub fn to_sql(&self) -> String {
        match self {
            Self::DropTable { table } => {
                format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
            }
            Self::CreateTable { table, columns } => {
                let cols = columns
                    .iter()
                    .map(ColumnSpec::to_sql)
                    .collect::<Vec<_>>()
                    .join(",\n  ");
                format!(
                    "CREATE TABLE IF NOT EXISTS {} (\n  {}\n) {TABLE_OPTIONS}",
                    quote_identifier(table),
                    cols
                )
            }
        }
    }
}
