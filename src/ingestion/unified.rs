//! Source format classification and reader dispatch.
//!
//! Most callers should use [`read_source`], which reads a file into a [`DataSet`] with the
//! chosen [`ParseStrategy`]:
//!
//! - [`ParseStrategy::FixedWidth`] slices lines by a layout's positions and falls back to
//!   delimited parsing when the fixed-width read fails
//! - [`ParseStrategy::Delimited`] auto-detects encoding and delimiter
//! - [`ParseStrategy::Dbf`] reads dBase tables

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{LoadError, LoadResult};
use crate::layout::TableLayout;
use crate::types::DataSet;

use super::{dbf, delimited, fixed_width, ReadOptions};

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceFormat {
    /// `.txt` / `.csv`: delimited text, or fixed-width when a layout governs it.
    Text,
    /// `.dbf`: dBase table.
    Dbf,
    /// `.zip`: archive whose members are classified again.
    Zip,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "csv" => Some(Self::Text),
            "dbf" => Some(Self::Dbf),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    /// Source format of a path, from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// How a data file is turned into rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseStrategy {
    Delimited,
    FixedWidth,
    Dbf,
}

impl ParseStrategy {
    /// Strategy for a data file of `format`, given whether a layout governs it.
    pub fn select(format: SourceFormat, governed: bool) -> Option<Self> {
        match format {
            SourceFormat::Text if governed => Some(Self::FixedWidth),
            SourceFormat::Text => Some(Self::Delimited),
            SourceFormat::Dbf => Some(Self::Dbf),
            SourceFormat::Zip => None,
        }
    }
}

/// Read `path` with `strategy`.
///
/// `layout` supplies fixed-width positions; without one, [`ParseStrategy::FixedWidth`] reads
/// the file as delimited text.
pub fn read_source(
    path: impl AsRef<Path>,
    strategy: ParseStrategy,
    layout: Option<&TableLayout>,
    options: &ReadOptions,
) -> LoadResult<DataSet> {
    let path = path.as_ref();
    match (strategy, layout) {
        (ParseStrategy::FixedWidth, Some(layout)) => {
            match fixed_width::read_fixed_width(path, &layout.positions, options) {
                Ok(ds) => Ok(ds),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "fixed-width read failed; retrying as delimited");
                    delimited::read_delimited(path, options)
                }
            }
        }
        (ParseStrategy::FixedWidth | ParseStrategy::Delimited, _) => {
            delimited::read_delimited(path, options)
        }
        (ParseStrategy::Dbf, _) => dbf::read_dbf(path, options.encoding),
    }
}

/// Read `path`, choosing the strategy from its extension.
pub fn read_path(
    path: impl AsRef<Path>,
    layout: Option<&TableLayout>,
    options: &ReadOptions,
) -> LoadResult<DataSet> {
    let path = path.as_ref();
    let strategy = SourceFormat::from_path(path)
        .and_then(|f| ParseStrategy::select(f, layout.is_some()))
        .ok_or_else(|| LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
    read_source(path, strategy, layout, options)
}
