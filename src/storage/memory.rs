//! In-memory [`TableSink`].

use std::collections::BTreeMap;

use crate::error::{LoadError, LoadResult};
use crate::layout::ColumnSpec;
use crate::types::Value;

use super::{DdlStatement, TableSink};

/// A table held by [`MemorySink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    pub columns: Vec<ColumnSpec>,
    /// Rows in `columns` order.
    pub rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c.name == column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Stores tables in memory, applying DDL with MySQL's `IF [NOT] EXISTS` semantics.
///
/// Every executed statement is kept in [`MemorySink::statements`] so callers can inspect what a
/// database would have received.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, MemoryTable>,
    statements: Vec<DdlStatement>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn statements(&self) -> &[DdlStatement] {
        &self.statements
    }
}

impl TableSink for MemorySink {
    fn execute(&mut self, statements: &[DdlStatement]) -> LoadResult<()> {
        for stmt in statements {
            match stmt {
                DdlStatement::DropTable { table } => {
                    self.tables.remove(table);
                }
                DdlStatement::CreateTable { table, columns } => {
                    self.tables
                        .entry(table.clone())
                        .or_insert_with(|| MemoryTable {
                            columns: columns.clone(),
                            rows: Vec::new(),
                        });
                }
            }
            self.statements.push(stmt.clone());
        }
        Ok(())
    }

    fn insert_rows(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> LoadResult<u64> {
        let target = self.tables.get_mut(table).ok_or_else(|| LoadError::Storage {
            message: format!("table `{table}` does not exist"),
        })?;

        let positions = columns
            .iter()
            .map(|name| {
                target
                    .columns
                    .iter()
                    .position(|c| &c.name == name)
                    .ok_or_else(|| LoadError::Storage {
                        message: format!("unknown column `{name}` in table `{table}`"),
                    })
            })
            .collect::<LoadResult<Vec<usize>>>()?;

        let width = target.columns.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(LoadError::Storage {
                    message: format!(
                        "row {i} has {} values for {} columns",
                        row.len(),
                        columns.len()
                    ),
                });
            }
            let mut stored = vec![Value::Null; width];
            for (value, &pos) in row.iter().zip(&positions) {
                stored[pos] = value.clone();
            }
            target.rows.push(stored);
        }
        Ok(rows.len() as u64)
    }
}
