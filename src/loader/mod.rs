//! File loader: discovers input files, resolves each to a target table and writes it through a
//! [`TableSink`].
//!
//! A run goes through these steps:
//!
//! - discover files under the input, expanding `.zip` archives into scratch directories
//! - parse every `*_layout` descriptor into a [`TableLayout`] keyed by base table key
//! - provision every layout table up front
//! - load each data file in sorted order: resolve, read, align and batch-insert
//!
//! One failing file never stops the run; failures are reported to the configured
//! [`LoadObserver`] and counted in the [`RunSummary`].
//!
//! ```no_run
//! use std::path::Path;
//! use sigtap_loader::loader::{LoadOptions, Loader};
//! use sigtap_loader::storage::MemorySink;
//!
//! # fn main() -> Result<(), sigtap_loader::LoadError> {
//! let mut loader = Loader::new(MemorySink::new(), LoadOptions::default());
//! let summary = loader.run(Path::new("/data/sigtap/202301"))?;
//! println!("rows={} failed={}", summary.total_rows, summary.files_failed);
//! # Ok(())
//! # }
//! ```

pub mod discover;
pub mod observability;
pub mod resolve;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{LoadError, LoadResult};
use crate::ingestion::{read_source, ParseStrategy, ReadOptions, SourceFormat};
use crate::layout::{read_layout_file, ColumnSpec, TableLayout};
use crate::naming::{is_layout_stem, layout_base_key, Competency};
use crate::storage::{provision_table, ProvisionRequest, TableSink, WriteMode, COMPETENCY_COLUMN};
use crate::types::{ColumnType, Field, Value};

pub use discover::{discover, Discovery, SourceFile};
pub use observability::{
    CompositeObserver, FileContext, FileObserver, FileStats, LoadObserver, LoadSeverity,
    TracingObserver,
};
pub use resolve::{file_competency, plain_table_name, resolve_file, Resolution};

/// Rows per insert batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 25_000;

/// Options for a [`Loader`] run.
#[derive(Clone)]
pub struct LoadOptions {
    /// Delimiter and encoding overrides passed to every reader.
    pub read: ReadOptions,
    /// Drop and recreate tables before their first write in the run.
    pub recreate: bool,
    /// Rows per insert batch.
    pub batch_size: usize,
    /// Resolve and report every file without touching the sink.
    pub dry_run: bool,
    /// Competency applied to every file instead of path detection.
    pub competency_override: Option<Competency>,
    /// Optional observer for per-file outcomes and alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
    /// Checked between files; once set, the run stops and returns what it has.
    pub cancel: Arc<AtomicBool>,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("read", &self.read)
            .field("recreate", &self.recreate)
            .field("batch_size", &self.batch_size)
            .field("dry_run", &self.dry_run)
            .field("competency_override", &self.competency_override)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            recreate: false,
            batch_size: DEFAULT_BATCH_SIZE,
            dry_run: false,
            competency_override: None,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// What a dry run would do with one data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePlan {
    pub path: PathBuf,
    pub table: String,
    pub competency: Option<Competency>,
    pub strategy: ParseStrategy,
    /// Base key of the governing layout, if any.
    pub layout: Option<String>,
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_loaded: usize,
    pub files_failed: usize,
    /// Files with no columns to store, plus `_layout` files that are not `.txt`/`.csv`.
    pub files_skipped: usize,
    /// Rows written per table.
    pub tables: BTreeMap<String, u64>,
    pub total_rows: u64,
    /// Base keys of the layouts in effect.
    pub layouts: Vec<String>,
    /// Dry-run plans, in processing order.
    pub plans: Vec<FilePlan>,
    /// The run stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Loads files into a [`TableSink`].
#[derive(Debug)]
pub struct Loader<S: TableSink> {
    sink: S,
    options: LoadOptions,
}

impl<S: TableSink> Loader<S> {
    pub fn new(sink: S, options: LoadOptions) -> Self {
        Self { sink, options }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load every supported file under `input` (or `input` itself).
    ///
    /// Only a missing input is fatal. Per-file failures are counted in the summary and
    /// reported to the observer; scratch directories are removed before returning.
    pub fn run(&mut self, input: &Path) -> LoadResult<RunSummary> {
        let discovery = discover(input)?;
        let mut summary = RunSummary::default();

        for (path, error) in &discovery.failures {
            summary.files_failed += 1;
            self.report_failure(&FileContext::unresolved(path), error);
        }
        if discovery.files.is_empty() {
            warn!(input = %input.display(), "no .txt, .csv, .dbf or .zip files found");
            return Ok(summary);
        }

        let (layout_files, data_files): (Vec<&SourceFile>, Vec<&SourceFile>) = discovery
            .files
            .iter()
            .partition(|f| f.format() == Some(SourceFormat::Text) && is_layout_stem(f.stem()));

        let layouts = self.load_layouts(&layout_files);
        summary.layouts = layouts.keys().cloned().collect();
        if !self.options.dry_run {
            self.provision_layouts(&layouts);
        }

        let mut written_tables = HashSet::new();
        for file in data_files {
            if self.options.cancel.load(Ordering::Relaxed) {
                info!("cancellation requested; stopping before {}", file.logical_path.display());
                summary.cancelled = true;
                break;
            }
            if is_layout_stem(file.stem()) {
                warn!(path = %file.logical_path.display(), "layout descriptors must be .txt or .csv; skipping");
                summary.files_skipped += 1;
                continue;
            }

            let mut ctx = FileContext::unresolved(&file.logical_path);
            let outcome = self.process_file(file, &layouts, &mut written_tables, &mut ctx, &mut summary.plans);

            match outcome {
                Ok(Some((table, rows))) => {
                    summary.files_loaded += 1;
                    summary.total_rows += rows;
                    *summary.tables.entry(table).or_default() += rows;
                    if let Some(obs) = self.options.observer.as_ref() {
                        obs.on_file_loaded(&ctx, FileStats { rows });
                    }
                }
                Ok(None) if self.options.dry_run => {}
                Ok(None) => summary.files_skipped += 1,
                Err(e) => {
                    summary.files_failed += 1;
                    self.report_failure(&ctx, &e);
                }
            }
        }

        info!(
            loaded = summary.files_loaded,
            failed = summary.files_failed,
            rows = summary.total_rows,
            "run finished"
        );
        Ok(summary)
    }

    fn load_layouts(&self, files: &[&SourceFile]) -> BTreeMap<String, TableLayout> {
        let mut layouts = BTreeMap::new();
        for file in files {
            let key = layout_base_key(file.stem());
            let parsed = if key.is_empty() {
                Err(LoadError::InvalidLayout {
                    message: format!("no table name in {:?}", file.stem()),
                })
            } else {
                read_layout_file(&file.path, &self.options.read).and_then(|layout| {
                    if layout.is_empty() {
                        Err(LoadError::InvalidLayout {
                            message: "no column definitions".to_string(),
                        })
                    } else {
                        Ok(layout)
                    }
                })
            };

            match parsed {
                Ok(layout) => {
                    debug!(path = %file.logical_path.display(), table = %key, columns = layout.len(), "layout loaded");
                    if layouts.insert(key.clone(), layout).is_some() {
                        warn!(table = %key, path = %file.logical_path.display(), "layout replaces an earlier one with the same key");
                    }
                }
                Err(e) => {
                    warn!(path = %file.logical_path.display(), error = %e, "ignoring layout");
                    if let Some(obs) = self.options.observer.as_ref() {
                        obs.on_layout_rejected(&file.logical_path, &e);
                    }
                }
            }
        }
        layouts
    }

    fn provision_layouts(&mut self, layouts: &BTreeMap<String, TableLayout>) {
        for (key, layout) in layouts {
            let request = ProvisionRequest {
                recreate: self.options.recreate,
                ..ProvisionRequest::new(key.clone(), layout.columns.clone())
            };
            match provision_table(&mut self.sink, &request) {
                Ok(()) => info!(table = %key, "table provisioned from layout"),
                Err(e) => warn!(table = %key, error = %e, "failed to provision layout table"),
            }
        }
    }

    /// Resolve one data file and either plan or load it.
    ///
    /// Returns the table and rows written, or `None` for dry runs and column-less files.
    fn process_file(
        &mut self,
        file: &SourceFile,
        layouts: &BTreeMap<String, TableLayout>,
        written_tables: &mut HashSet<String>,
        ctx: &mut FileContext,
        plans: &mut Vec<FilePlan>,
    ) -> LoadResult<Option<(String, u64)>> {
        let resolution = resolve_file(file, layouts, self.options.competency_override.as_ref())?;
        ctx.table = Some(resolution.table.clone());
        ctx.strategy = Some(resolution.strategy);

        if self.options.dry_run {
            info!(
                path = %file.logical_path.display(),
                table = %resolution.table,
                strategy = ?resolution.strategy,
                "[dry-run] planned"
            );
            plans.push(FilePlan {
                path: file.logical_path.clone(),
                table: resolution.table,
                competency: resolution.competency,
                strategy: resolution.strategy,
                layout: resolution.layout,
            });
            return Ok(None);
        }

        let rows = self.load_file(file, &resolution, layouts, written_tables)?;
        Ok(rows.map(|rows| (resolution.table, rows)))
    }

    /// Returns the rows written, or `None` when the data has no columns.
    fn load_file(
        &mut self,
        file: &SourceFile,
        resolution: &Resolution,
        layouts: &BTreeMap<String, TableLayout>,
        written_tables: &mut HashSet<String>,
    ) -> LoadResult<Option<u64>> {
        let layout = resolution.layout.as_ref().and_then(|k| layouts.get(k));
        info!(path = %file.logical_path.display(), table = %resolution.table, "loading");

        let mut data = read_source(&file.path, resolution.strategy, layout, &self.options.read)?;
        if data.schema.is_empty() {
            warn!(path = %file.logical_path.display(), "no columns found; skipping");
            return Ok(None);
        }
        match (layout, &resolution.competency) {
            (Some(layout), _) => data = data.align_to(&layout.schema()),
            (None, Some(tag)) if data.schema.index_of(COMPETENCY_COLUMN).is_none() => {
                data.prepend_constant(
                    Field::new(COMPETENCY_COLUMN, ColumnType::Char(6)),
                    Value::text(tag.as_str()),
                );
            }
            _ => {}
        }

        if data.row_count() == 0 {
            warn!(path = %file.logical_path.display(), "empty file");
        }

        let table = &resolution.table;
        let mode = if layout.is_none() && self.options.recreate && !written_tables.contains(table) {
            WriteMode::Replace
        } else {
            WriteMode::Append
        };
        let request = ProvisionRequest {
            recreate: mode == WriteMode::Replace,
            ..ProvisionRequest::new(
                table.clone(),
                data.schema.fields.iter().map(ColumnSpec::from).collect(),
            )
        };
        provision_table(&mut self.sink, &request)?;
        written_tables.insert(table.clone());

        let columns: Vec<String> = data.schema.field_names().map(str::to_string).collect();
        let mut written = 0u64;
        for range in batch_ranges(data.row_count(), self.options.batch_size) {
            let batch = &data.rows[range];
            written += self.sink.insert_rows(table, &columns, batch)?;
            debug!(table = %table, rows = batch.len(), "batch written");
        }
        Ok(Some(written))
    }

    fn report_failure(&self, ctx: &FileContext, error: &LoadError) {
        if let Some(obs) = self.options.observer.as_ref() {
            let sev = LoadSeverity::of(error);
            obs.on_file_failed(ctx, sev, error);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }
}

fn batch_ranges(row_count: usize, batch_size: usize) -> Vec<Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let batch_size = batch_size.max(1);
    let mut out = Vec::with_capacity(row_count.div_ceil(batch_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + batch_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
