//! Fixed-width ingestion driven by layout positions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::detect::{decode_text, detect_encoding_with, SAMPLE_BYTES};
use crate::error::LoadResult;
use crate::layout::LayoutPosition;
use crate::types::{DataSet, Field, Schema, Value};

use super::ReadOptions;

/// Read a fixed-width file, slicing every line by `positions`.
///
/// Positions are 1-based and inclusive. A missing start means column 1; a missing end means end
/// of line. Slices are trimmed; a line shorter than a range yields an empty string. Blank lines
/// are skipped. The delimiter override in `options` is ignored.
pub fn read_fixed_width(
    path: impl AsRef<Path>,
    positions: &[LayoutPosition],
    options: &ReadOptions,
) -> LoadResult<DataSet> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let encoding = options.encoding.unwrap_or_else(|| {
        detect_encoding_with(
            &bytes[..bytes.len().min(SAMPLE_BYTES as usize)],
            options.encoding_strategy,
        )
    });
    debug!(path = %path.display(), encoding = encoding.name(), columns = positions.len(), "reading fixed-width file");

    Ok(read_fixed_width_str(&decode_text(&bytes, encoding), positions))
}

/// Slice already-decoded text. Duplicate column names keep their first position.
pub fn read_fixed_width_str(input: &str, positions: &[LayoutPosition]) -> DataSet {
    let mut seen = HashSet::new();
    let positions: Vec<&LayoutPosition> = positions
        .iter()
        .filter(|p| seen.insert(p.column_name.as_str()))
        .collect();

    let schema = Schema::new(
        positions
            .iter()
            .map(|p| Field::text(p.column_name.clone()))
            .collect(),
    );

    let rows = input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let chars: Vec<char> = line.chars().collect();
            positions
                .iter()
                .map(|p| Value::Text(slice_columns(&chars, p.start, p.end)))
                .collect()
        })
        .collect();

    DataSet::new(schema, rows)
}

// 1-based inclusive [start, end] -> 0-based half-open [start - 1, end).
fn slice_columns(chars: &[char], start: Option<usize>, end: Option<usize>) -> String {
    let from = start.unwrap_or(1).saturating_sub(1).min(chars.len());
    let to = end.map_or(chars.len(), |e| e.max(from)).min(chars.len());
    chars[from..to].iter().collect::<String>().trim().to_string()
}
