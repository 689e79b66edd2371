//! Input discovery and archive expansion.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{LoadError, LoadResult};
use crate::ingestion::SourceFormat;

/// Prefix of the scratch directories archives are extracted into.
pub const ZIP_SCRATCH_PREFIX: &str = "sigtap_zip_";

/// A supported file found under the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Where the bytes are on disk.
    pub path: PathBuf,
    /// Path used for competency detection and reporting. Equal to `path` except for archive
    /// members, which appear as `archive.zip/member`.
    pub logical_path: PathBuf,
}

impl SourceFile {
    fn on_disk(path: PathBuf) -> Self {
        Self {
            logical_path: path.clone(),
            path,
        }
    }

    /// File stem of the logical path.
    pub fn stem(&self) -> &str {
        self.logical_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    pub fn format(&self) -> Option<SourceFormat> {
        SourceFormat::from_path(&self.logical_path)
    }
}

/// Result of [`discover`]: the files to process, sorted by logical path.
///
/// Holds the scratch directories of extracted archives; they are removed when this value is
/// dropped.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<SourceFile>,
    /// Archives that could not be extracted.
    pub failures: Vec<(PathBuf, LoadError)>,
    scratch: Vec<TempDir>,
}

impl Discovery {
    /// Scratch directories currently held.
    pub fn scratch_dirs(&self) -> Vec<&Path> {
        self.scratch.iter().map(TempDir::path).collect()
    }
}

/// Find every `.txt`, `.csv`, `.dbf` and `.zip` under `input` (or `input` itself when it is a
/// file) and expand archives one level deep. Nested archives are ignored.
pub fn discover(input: &Path) -> LoadResult<Discovery> {
    if !input.exists() {
        return Err(LoadError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let candidates = if input.is_file() {
        vec![input.to_path_buf()]
    } else {
        supported_files(input)
    };

    let mut discovery = Discovery::default();
    for path in candidates {
        if SourceFormat::from_path(&path) != Some(SourceFormat::Zip) {
            discovery.files.push(SourceFile::on_disk(path));
            continue;
        }
        match extract_archive(&path) {
            Ok((dir, members)) => {
                debug!(archive = %path.display(), members = members.len(), scratch = %dir.path().display(), "expanded archive");
                discovery.files.extend(members);
                discovery.scratch.push(dir);
            }
            Err(e) => {
                warn!(archive = %path.display(), error = %e, "failed to extract archive");
                discovery.failures.push((path, e));
            }
        }
    }

    discovery
        .files
        .sort_by(|a, b| a.logical_path.cmp(&b.logical_path));
    Ok(discovery)
}

fn supported_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && SourceFormat::from_path(e.path()).is_some())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn extract_archive(archive_path: &Path) -> LoadResult<(TempDir, Vec<SourceFile>)> {
    let dir = tempfile::Builder::new()
        .prefix(ZIP_SCRATCH_PREFIX)
        .tempdir()?;
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;

    let mut members = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry.enclosed_name() else {
            warn!(archive = %archive_path.display(), member = entry.name(), "skipping member with unsafe path");
            continue;
        };
        match SourceFormat::from_path(&name) {
            Some(SourceFormat::Zip) => {
                debug!(member = %name.display(), "skipping nested archive");
                continue;
            }
            None => continue,
            Some(_) => {}
        }

        let target = dir.path().join(&name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        io::copy(&mut entry, &mut File::create(&target)?)?;
        members.push(SourceFile {
            path: target,
            logical_path: archive_path.join(&name),
        });
    }
    Ok((dir, members))
}
