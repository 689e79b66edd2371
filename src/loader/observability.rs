use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::LoadError;
use crate::ingestion::ParseStrategy;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (one file failed).
    Error,
    /// Critical error (I/O or database failures).
    Critical,
}

impl LoadSeverity {
    /// Severity of a per-file failure.
    pub fn of(error: &LoadError) -> Self {
        match error {
            LoadError::Io(_) => Self::Critical,
            #[cfg(feature = "mysql")]
            LoadError::Database(_) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about one data file.
#[derive(Debug, Clone)]
pub struct FileContext {
    /// Logical path (`archive.zip/member` for archive members).
    pub path: PathBuf,
    /// Target table, once resolved.
    pub table: Option<String>,
    /// Parse strategy, once resolved.
    pub strategy: Option<ParseStrategy>,
}

impl FileContext {
    /// Context of a file whose table is not known yet.
    pub fn unresolved(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: None,
            strategy: None,
        }
    }
}

/// Stats reported when a file loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// Rows written to the sink.
    pub rows: u64,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when a data file has been written.
    fn on_file_loaded(&self, _ctx: &FileContext, _stats: FileStats) {}

    /// Called when a data file fails. The run continues with the next file.
    fn on_file_failed(&self, _ctx: &FileContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_file_failed`].
    fn on_alert(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        self.on_file_failed(ctx, severity, error)
    }

    /// Called when a layout descriptor cannot be parsed and is left out of the run.
    fn on_layout_rejected(&self, _path: &Path, _error: &LoadError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: FileStats) {
        for o in &self.observers {
            o.on_file_loaded(ctx, stats);
        }
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_file_failed(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_layout_rejected(&self, path: &Path, error: &LoadError) {
        for o in &self.observers {
            o.on_layout_rejected(path, error);
        }
    }
}

/// Emits load events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: FileStats) {
        info!(
            path = %ctx.path.display(),
            table = ctx.table.as_deref().unwrap_or("-"),
            rows = stats.rows,
            "file loaded"
        );
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        error!(
            path = %ctx.path.display(),
            table = ctx.table.as_deref().unwrap_or("-"),
            ?severity,
            error = %error,
            "file failed"
        );
    }

    fn on_alert(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        error!(
            alert = true,
            path = %ctx.path.display(),
            ?severity,
            error = %error,
            "load alert"
        );
    }

    fn on_layout_rejected(&self, path: &Path, error: &LoadError) {
        warn!(path = %path.display(), error = %error, "layout rejected");
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: FileStats) {
        self.append_line(&format!(
            "{} ok table={} path={} rows={}",
            unix_ts(),
            ctx.table.as_deref().unwrap_or("-"),
            ctx.path.display(),
            stats.rows
        ));
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} fail severity={:?} table={} path={} err={}",
            unix_ts(),
            severity,
            ctx.table.as_deref().unwrap_or("-"),
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &FileContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.path.display(),
            error
        ));
    }

    fn on_layout_rejected(&self, path: &Path, error: &LoadError) {
        self.append_line(&format!(
            "{} layout-rejected path={} err={}",
            unix_ts(),
            path.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
