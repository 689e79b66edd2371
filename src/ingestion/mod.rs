//! Tabular readers.
//!
//! Most callers should use [`read_source`] (from [`unified`]) which dispatches on a
//! [`ParseStrategy`]. Format-specific functions are also available under:
//! - [`delimited`]
//! - [`fixed_width`]
//! - [`dbf`]
//!
//! Every reader produces a [`crate::types::DataSet`] of raw text values with sanitized column
//! names.

use encoding_rs::Encoding;

use crate::detect::EncodingStrategy;

pub mod dbf;
pub mod delimited;
pub mod fixed_width;
pub mod unified;

pub use unified::{read_path, read_source, ParseStrategy, SourceFormat};

/// Parsing overrides shared by all readers.
///
/// Use [`Default`] to auto-detect everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Field delimiter; detected per file when `None`.
    pub delimiter: Option<u8>,
    /// Text encoding; detected per file when `None` (DBF files default to Latin-1).
    pub encoding: Option<&'static Encoding>,
    /// Detection method used when `encoding` is `None`.
    pub encoding_strategy: EncodingStrategy,
}
