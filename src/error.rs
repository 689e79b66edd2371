use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by the readers, the storage layer and the loader.
///
/// Leaf components (detectors, the identifier sanitizer, the competency extractor and the type
/// mapper) never return this type: they always produce a usable value.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited text could not be read.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// An archive could not be opened or extracted.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[cfg(feature = "mysql")]
    /// Database error (feature-gated behind `mysql`).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The input path given to the loader does not exist.
    #[error("input path not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// A layout descriptor is missing required columns or is otherwise unusable.
    #[error("invalid layout: {message}")]
    InvalidLayout { message: String },

    /// A DBF file is truncated or has a malformed header.
    #[error("malformed dbf file {}: {message}", path.display())]
    Dbf { path: PathBuf, message: String },

    /// The file extension does not map to a supported source format.
    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The storage sink rejected a statement or batch.
    #[error("storage error: {message}")]
    Storage { message: String },
}
