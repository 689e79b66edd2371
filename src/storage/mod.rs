//! Storage layer: the [`TableSink`] seam, DDL generation and table provisioning.
//!
//! Two sinks ship with the crate:
//!
//! - [`memory::MemorySink`]: in-process tables, used by tests and dry tooling
//! - [`mysql::MySqlSink`] (Cargo feature `mysql`): a MySQL database through `sqlx`

pub mod ddl;
pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod provision;

use crate::error::LoadResult;
use crate::types::Value;

pub use ddl::DdlStatement;
pub use memory::MemorySink;
#[cfg(feature = "mysql")]
pub use mysql::{ensure_database, DatabaseConfig, MySqlSink};
pub use provision::{provision_table, ProvisionRequest, COMPETENCY_COLUMN};

/// How the first batch of a table is written within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop the table and create it from the data's schema.
    Replace,
    /// Create the table if missing and add rows to it.
    Append,
}

/// Destination for provisioned tables and row batches.
///
/// Identifiers passed to a sink are already sanitized.
pub trait TableSink {
    /// Execute `statements` in order, in one transaction.
    fn execute(&mut self, statements: &[DdlStatement]) -> LoadResult<()>;

    /// Insert `rows` into `table`. Every row is parallel to `columns`.
    ///
    /// Returns the number of rows written.
    fn insert_rows(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> LoadResult<u64>;
}

impl<S: TableSink + ?Sized> TableSink for &mut S {
    fn execute(&mut self, statements: &[DdlStatement]) -> LoadResult<()> {
        (**self).execute(statements)
    }

    fn insert_rows(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> LoadResult<u64> {
        (**self).insert_rows(table, columns, rows)
    }
}
