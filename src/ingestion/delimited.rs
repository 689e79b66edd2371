//! Delimited text ingestion (`.txt` / `.csv`) with encoding and delimiter auto-detection.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::detect::{decode_text, detect_delimiter, detect_encoding_with, SAMPLE_BYTES};
use crate::error::LoadResult;
use crate::naming::identifier_or_placeholder;
use crate::types::{DataSet, Field, Schema, Value};

use super::ReadOptions;

/// Read a delimited text file into a [`DataSet`] of raw text values.
///
/// Rules:
///
/// - Encoding and delimiter are detected from the first [`SAMPLE_BYTES`] unless `options`
///   overrides them.
/// - The first row is the header; header names are sanitized.
/// - Every token is kept verbatim as [`Value::Text`], empty tokens included.
/// - Rows with more fields than the header are skipped; shorter rows are padded with
///   [`Value::Null`].
pub fn read_delimited(path: impl AsRef<Path>, options: &ReadOptions) -> LoadResult<DataSet> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let sample = &bytes[..bytes.len().min(SAMPLE_BYTES as usize)];

    let encoding = options
        .encoding
        .unwrap_or_else(|| detect_encoding_with(sample, options.encoding_strategy));
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| detect_delimiter(&decode_text(sample, encoding)));
    debug!(
        path = %path.display(),
        encoding = encoding.name(),
        delimiter = %(delimiter as char).escape_default(),
        "reading delimited file"
    );

    read_delimited_str(&decode_text(&bytes, encoding), delimiter)
}

/// Read already-decoded delimited text.
pub fn read_delimited_str(input: &str, delimiter: u8) -> LoadResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());
    read_delimited_from_reader(&mut rdr)
}

/// Read delimited data from an existing CSV reader (which must be configured with headers).
pub fn read_delimited_from_reader<R: Read>(rdr: &mut csv::Reader<R>) -> LoadResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let schema = header_schema(headers.iter());
    let width = schema.len();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut skipped = 0usize;
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!(row = user_row, error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        if record.len() > width {
            debug!(
                row = user_row,
                fields = record.len(),
                expected = width,
                "skipping malformed row"
            );
            skipped += 1;
            continue;
        }

        let mut row: Vec<Value> = record.iter().map(Value::text).collect();
        row.resize(width, Value::Null);
        rows.push(row);
    }

    if skipped > 0 {
        warn!(skipped, kept = rows.len(), "skipped malformed delimited rows");
    }

    Ok(DataSet::new(schema, rows))
}

/// Text schema from raw header names: sanitized, empty names replaced by `col_{i}`, and later
/// duplicates renamed to `col_{i}` as well. A rename that is still taken gets a `_2`, `_3`, ...
/// suffix, so names are always unique.
pub(crate) fn header_schema<'a>(headers: impl IntoIterator<Item = &'a str>) -> Schema {
    let mut seen = HashSet::new();
    let fields = headers
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let mut name = identifier_or_placeholder(raw, i);
            if seen.contains(&name) {
                name = format!("col_{i}");
            }
            let base = name.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            Field::text(name)
        })
        .collect();
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_are_sanitized_with_placeholders() {
        let schema = header_schema(["Código", "", "Valor Total", "valor_total"]);
        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, ["c_digo", "col_1", "valor_total", "col_3"]);
    }

    #[test]
    fn renamed_duplicates_never_collide() {
        let names: Vec<String> = header_schema(["col_1", ""])
            .field_names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["col_1", "col_1_2"]);

        let names: Vec<String> = header_schema(["a", "col_2", "a", "a"])
            .field_names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["a", "col_2", "col_2_2", "col_3"]);
    }

    #[test]
    fn tokens_are_kept_verbatim() {
        let ds = read_delimited_str("a;b;c\n 1 ;;NA\n", b';').unwrap();
        assert_eq!(
            ds.rows,
            vec![vec![Value::text(" 1 "), Value::text(""), Value::text("NA")]]
        );
    }

    #[test]
    fn long_rows_skipped_short_rows_padded() {
        let ds = read_delimited_str("a|b\n1|2\n1|2|3\n9\n", b'|').unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[1], vec![Value::text("9"), Value::Null]);
    }

    #[test]
    fn empty_input_yields_empty_dataset() {
        let ds = read_delimited_str("", b'|').unwrap();
        assert!(ds.schema.is_empty());
        assert_eq!(ds.row_count(), 0);
    }
}
