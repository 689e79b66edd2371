//! Layout descriptor parsing.
//!
//! A layout descriptor is a small delimited table with one row per column of a fixed-width data
//! file: `coluna, tamanho, inicio, fim, tipo` (name, length, 1-based start, 1-based end, legacy
//! type name).

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::error::{LoadError, LoadResult};
use crate::ingestion::delimited::read_delimited;
use crate::ingestion::ReadOptions;
use crate::naming::{identifier_or_placeholder, quote_identifier, sanitize_identifier};
use crate::types::{ColumnType, DataSet, Field, Schema, Value};

use super::type_map::map_layout_type;

/// Column headers a layout descriptor must carry.
pub const REQUIRED_LAYOUT_COLUMNS: [&str; 5] = ["coluna", "tamanho", "inicio", "fim", "tipo"];

/// One column definition of a target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Sanitized, non-empty column name.
    pub name: String,
    /// Storage type.
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

impl ColumnSpec {
    /// Create a spec; `name` must already be sanitized.
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }

    /// Storage type string, e.g. `VARCHAR(255)`.
    pub fn storage_type(&self) -> String {
        self.column_type.to_string()
    }

    /// Column definition clause for `CREATE TABLE`.
    pub fn to_sql(&self) -> String {
        let null_sql = if self.nullable { "NULL" } else { "NOT NULL" };
        format!(
            "{} {} {}",
            quote_identifier(&self.name),
            self.column_type,
            null_sql
        )
    }
}

impl From<&Field> for ColumnSpec {
    fn from(field: &Field) -> Self {
        Self::new(field.name.clone(), field.column_type, true)
    }
}

/// Fixed-width slice of one column (1-based, inclusive). Unset bounds could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPosition {
    pub column_name: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl LayoutPosition {
    pub fn new(column_name: impl Into<String>, start: Option<usize>, end: Option<usize>) -> Self {
        Self {
            column_name: column_name.into(),
            start,
            end,
        }
    }
}

/// Declared shape of a table: column specs plus parallel fixed-width positions, in layout order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TableLayout {
    pub columns: Vec<ColumnSpec>,
    pub positions: Vec<LayoutPosition>,
}

impl TableLayout {
    /// Typed schema of the layout, keeping the first column of any duplicated name.
    pub fn schema(&self) -> Schema {
        let mut seen = HashSet::new();
        Schema::new(
            self.columns
                .iter()
                .filter(|c| seen.insert(c.name.as_str()))
                .map(|c| Field::new(c.name.clone(), c.column_type))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build a [`TableLayout`] from a descriptor table.
///
/// Header matching is case-insensitive. Rows with an empty column name are skipped; unparsable
/// lengths and positions are left unset instead of rejecting the layout.
pub fn parse_layout(table: &DataSet) -> LoadResult<TableLayout> {
    let header: Vec<String> = table
        .schema
        .field_names()
        .map(sanitize_identifier)
        .collect();
    let idx = |name: &str| header.iter().position(|h| h == name);

    let missing: Vec<&str> = REQUIRED_LAYOUT_COLUMNS
        .iter()
        .copied()
        .filter(|r| idx(*r).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::InvalidLayout {
            message: format!(
                "expected columns {REQUIRED_LAYOUT_COLUMNS:?}, missing {missing:?} (headers={header:?})"
            ),
        });
    }

    let [name_i, len_i, start_i, end_i, type_i] =
        REQUIRED_LAYOUT_COLUMNS.map(|r| idx(r).unwrap_or_default());

    let cell = |row: &[Value], i: usize| -> String {
        row.get(i)
            .and_then(Value::as_text)
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let mut layout = TableLayout::default();
    for row in &table.rows {
        let raw_name = cell(row, name_i);
        if raw_name.is_empty() {
            continue;
        }
        let length = cell(row, len_i).parse::<i64>().ok();
        let start = cell(row, start_i).parse::<usize>().ok();
        let end = cell(row, end_i).parse::<usize>().ok();
        let column_type = map_layout_type(&cell(row, type_i), length, None);

        let name = identifier_or_placeholder(&raw_name, layout.columns.len());
        layout
            .columns
            .push(ColumnSpec::new(name.clone(), column_type, true));
        layout.positions.push(LayoutPosition::new(name, start, end));
    }

    Ok(layout)
}

/// Read a layout descriptor file with delimited auto-detection and parse it.
pub fn read_layout_file(path: &Path, options: &ReadOptions) -> LoadResult<TableLayout> {
    let table = read_delimited(path, options)?;
    parse_layout(&table)
}
