//! MySQL sink (Cargo feature `mysql`).
//!
//! `sqlx` is async; [`MySqlSink`] owns a current-thread Tokio runtime and blocks on every call so
//! the loader can stay synchronous.

use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{Connection, MySql, MySqlConnection, MySqlPool, QueryBuilder};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::error::LoadResult;
use crate::naming::quote_identifier;
use crate::types::Value;

use super::{DdlStatement, TableSink};

/// MySQL caps prepared statements at 65 535 placeholders.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip)]
    pub password: String,
    pub database: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "SIgtap".to_string(),
        }
    }
}

impl DatabaseConfig {
    fn server_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .charset("utf8mb4")
    }

    fn database_options(&self) -> MySqlConnectOptions {
        self.server_options().database(&self.database)
    }
}

fn runtime() -> LoadResult<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

/// Create `config.database` if it does not exist (utf8mb4, unicode collation).
pub fn ensure_database(config: &DatabaseConfig) -> LoadResult<()> {
    let rt = runtime()?;
    rt.block_on(async {
        let mut conn = MySqlConnection::connect_with(&config.server_options()).await?;
        let sql = format!(
            "CREATE DATABASE IF NOT EXISTS {} DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
            quote_identifier(&config.database)
        );
        sqlx::query(&sql).execute(&mut conn).await?;
        conn.close().await?;
        Ok::<_, sqlx::Error>(())
    })?;
    info!(database = %config.database, host = %config.host, "database ready");
    Ok(())
}

/// [`TableSink`] writing to a MySQL database.
pub struct MySqlSink {
    runtime: Runtime,
    pool: MySqlPool,
}

impl std::fmt::Debug for MySqlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSink")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl MySqlSink {
    /// Connect to `config.database`, which must already exist (see [`ensure_database`]).
    pub fn connect(config: &DatabaseConfig) -> LoadResult<Self> {
        let runtime = runtime()?;
        let pool = runtime.block_on(
            MySqlPoolOptions::new()
                .max_connections(1)
                .connect_with(config.database_options()),
        )?;
        debug!(database = %config.database, "connected");
        Ok(Self { runtime, pool })
    }
}

impl TableSink for MySqlSink {
    fn execute(&mut self, statements: &[DdlStatement]) -> LoadResult<()> {
        let pool = &self.pool;
        self.runtime.block_on(async move {
            let mut tx = pool.begin().await?;
            for stmt in statements {
                let sql = stmt.to_sql();
                debug!(table = stmt.table(), "executing ddl");
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
            tx.commit().await
        })?;
        Ok(())
    }

    fn insert_rows(&mut self, table: &str, columns: &[String], rows: &[Vec<Value>]) -> LoadResult<u64> {
        if columns.is_empty() || rows.is_empty() {
            return Ok(0);
        }
        let rows_per_statement = (MAX_BIND_PARAMS / columns.len()).max(1);
        let prefix = format!(
            "INSERT INTO {} ({}) ",
            quote_identifier(table),
            columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let pool = &self.pool;
        let written = self.runtime.block_on(async move {
            let mut tx = pool.begin().await?;
            let mut written = 0u64;
            for chunk in rows.chunks(rows_per_statement) {
                let mut qb = QueryBuilder::<MySql>::new(prefix.as_str());
                qb.push_values(chunk, |mut b, row| {
                    for value in row {
                        b.push_bind(value.as_text().map(str::to_owned));
                    }
                });
                written += qb.build().execute(&mut *tx).await?.rows_affected();
            }
            tx.commit().await?;
            Ok::<_, sqlx::Error>(written)
        })?;
        Ok(written)
    }
}
