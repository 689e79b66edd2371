//! dBase (`.dbf`) ingestion.
//!
//! Reads dBase III / FoxPro tables: a 32-byte header, 32-byte field descriptors terminated by
//! `0x0D`, then fixed-length records prefixed by a deletion flag. Every field is coerced to
//! text. Memo fields are not followed into their side files and load as NULL.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use crate::detect::decode_text;
use crate::error::{LoadError, LoadResult};
use crate::types::{DataSet, Value};

use super::delimited::header_schema;

const HEADER_LEN: usize = 32;
const DESCRIPTOR_LEN: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const DELETED: u8 = b'*';

#[derive(Debug)]
struct DbfField {
    name: String,
    kind: u8,
    len: usize,
}

/// Read a DBF file. Text is decoded with `encoding`, Latin-1 when `None`.
///
/// A table that declares fields but holds no records still yields its (sanitized) columns.
pub fn read_dbf(path: impl AsRef<Path>, encoding: Option<&'static Encoding>) -> LoadResult<DataSet> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let ds = read_dbf_bytes(&bytes, encoding.unwrap_or(WINDOWS_1252)).map_err(|message| {
        LoadError::Dbf {
            path: path.to_path_buf(),
            message,
        }
    })?;
    debug!(path = %path.display(), columns = ds.schema.len(), rows = ds.row_count(), "read dbf file");
    Ok(ds)
}

/// Parse an in-memory DBF image.
pub fn read_dbf_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<DataSet, String> {
    if bytes.len() < HEADER_LEN {
        return Err(format!("header needs {HEADER_LEN} bytes, file has {}", bytes.len()));
    }
    let record_count = le_u32(&bytes[4..8]) as usize;
    let header_len = le_u16(&bytes[8..10]) as usize;
    let record_len = le_u16(&bytes[10..12]) as usize;
    if header_len < HEADER_LEN {
        return Err(format!("header length {header_len} is shorter than {HEADER_LEN} bytes"));
    }
    if record_len == 0 {
        return Err("record length is zero".to_string());
    }

    let mut fields = Vec::new();
    let mut offset = HEADER_LEN;
    while offset < header_len.min(bytes.len()) && bytes[offset] != HEADER_TERMINATOR {
        let desc = bytes
            .get(offset..offset + DESCRIPTOR_LEN)
            .ok_or_else(|| format!("truncated field descriptor at byte {offset}"))?;
        let name_end = desc[..11].iter().position(|&b| b == 0).unwrap_or(11);
        fields.push(DbfField {
            name: decode_text(&desc[..name_end], encoding).trim().to_string(),
            kind: desc[11].to_ascii_uppercase(),
            len: desc[16] as usize,
        });
        offset += DESCRIPTOR_LEN;
    }

    let data_len: usize = fields.iter().map(|f| f.len).sum::<usize>() + 1;
    if !fields.is_empty() && data_len > record_len {
        return Err(format!(
            "fields span {data_len} bytes but records are {record_len} bytes"
        ));
    }

    let schema = header_schema(fields.iter().map(|f| f.name.as_str()));
    let mut rows = Vec::with_capacity(record_count.min(1 << 20));
    for i in 0..record_count {
        let start = header_len + i * record_len;
        let Some(record) = bytes.get(start..start + record_len) else {
            debug!(expected = record_count, read = i, "dbf ends before declared record count");
            break;
        };
        match record.first() {
            None | Some(&END_OF_FILE) => break,
            Some(&DELETED) => continue,
            Some(_) => {}
        }

        let mut pos = 1;
        let row = fields
            .iter()
            .map(|f| {
                let raw = &record[pos..pos + f.len];
                pos += f.len;
                field_value(raw, f.kind, encoding)
            })
            .collect();
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn field_value(raw: &[u8], kind: u8, encoding: &'static Encoding) -> Value {
    match kind {
        b'C' => {
            let end = raw
                .iter()
                .rposition(|&b| b != b' ' && b != 0)
                .map_or(0, |i| i + 1);
            Value::Text(decode_text(&raw[..end], encoding))
        }
        b'D' => {
            let s = ascii_trimmed(raw);
            if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) && s != "00000000" {
                Value::Text(format!("{}-{}-{}", &s[..4], &s[4..6], &s[6..]))
            } else {
                Value::Null
            }
        }
        b'L' => match raw.first() {
            Some(b'T' | b't' | b'Y' | b'y') => Value::text("True"),
            Some(b'F' | b'f' | b'N' | b'n') => Value::text("False"),
            _ => Value::Null,
        },
        b'I' if raw.len() == 4 => Value::Text(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]).to_string()),
        b'M' | b'G' | b'P' => Value::Null,
        // N, F and anything else: the literal text, blank meaning missing.
        _ => {
            let s = ascii_trimmed(raw);
            if s.is_empty() {
                Value::Null
            } else {
                Value::Text(decode_text(s.as_bytes(), encoding))
            }
        }
    }
}

fn ascii_trimmed(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

fn le_u16(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Test helper: build a minimal dBase III image.
#[cfg(test)]
fn build_dbf(fields: &[(&str, u8, u8)], records: &[(bool, Vec<&str>)]) -> Vec<u8> {
    let header_len = HEADER_LEN + fields.len() * DESCRIPTOR_LEN + 1;
    let record_len = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

    let mut out = vec![0u8; HEADER_LEN];
    out[0] = 0x03;
    out[4..8].copy_from_slice(&(records.len() as u32).to_le_bytes());
    out[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    out[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());
    for (name, kind, len) in fields {
        let mut desc = [0u8; DESCRIPTOR_LEN];
        desc[..name.len()].copy_from_slice(name.as_bytes());
        desc[11] = *kind;
        desc[16] = *len;
        out.extend_from_slice(&desc);
    }
    out.push(HEADER_TERMINATOR);
    for (deleted, values) in records {
        out.push(if *deleted { DELETED } else { b' ' });
        for ((_, _, len), v) in fields.iter().zip(values) {
            let mut cell = WINDOWS_1252.encode(v).0.into_owned();
            cell.resize(*len as usize, b' ');
            out.extend_from_slice(&cell);
        }
    }
    out.push(END_OF_FILE);
    out
}
