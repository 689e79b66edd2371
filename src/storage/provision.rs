//! Table provisioning from column definitions.

use std::collections::HashSet;

use tracing::debug;

use crate::error::LoadResult;
use crate::layout::ColumnSpec;
use crate::types::ColumnType;

use super::{DdlStatement, TableSink};

/// Name of the column holding the competency tag.
pub const COMPETENCY_COLUMN: &str = "competencia";

/// What to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Sanitized table name.
    pub table: String,
    /// Column definitions in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Prepend a nullable `competencia CHAR(6)` column.
    pub add_competency: bool,
    /// Drop the table before creating it.
    pub recreate: bool,
}

impl ProvisionRequest {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table: table.into(),
            columns,
            add_competency: false,
            recreate: false,
        }
    }

    /// Statements that realize this request, in execution order.
    pub fn statements(&self) -> Vec<DdlStatement> {
        let mut seen = HashSet::new();
        let mut columns: Vec<ColumnSpec> = self
            .columns
            .iter()
            .filter(|c| seen.insert(c.name.as_str()))
            .cloned()
            .collect();

        if self.add_competency && !columns.iter().any(|c| c.name == COMPETENCY_COLUMN) {
            columns.insert(0, ColumnSpec::new(COMPETENCY_COLUMN, ColumnType::Char(6), true));
        }

        let mut out = Vec::with_capacity(2);
        if self.recreate {
            out.push(DdlStatement::DropTable {
                table: self.table.clone(),
            });
        }
        out.push(DdlStatement::CreateTable {
            table: self.table.clone(),
            columns,
        });
        out
    }
}

/// Make sure `request.table` exists with the requested columns.
///
/// Without `recreate` this is idempotent: an existing table is left untouched.
pub fn provision_table<S: TableSink + ?Sized>(sink: &mut S, request: &ProvisionRequest) -> LoadResult<()> {
    let statements = request.statements();
    debug!(
        table = %request.table,
        recreate = request.recreate,
        statements = statements.len(),
        "provisioning table"
    );
    sink.execute(&statements)
}
