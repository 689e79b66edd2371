#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write `contents` to `dir/rel`, creating parent directories.
pub fn write_file(dir: &Path, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Encode text as Latin-1 (windows-1252).
pub fn latin1(text: &str) -> Vec<u8> {
    WINDOWS_1252.encode(text).0.into_owned()
}

/// Write a zip archive with the given `(member name, contents)` pairs.
pub fn write_zip(dir: &Path, rel: &str, members: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zw = ZipWriter::new(File::create(&path).unwrap());
    for (name, body) in members {
        zw.start_file(*name, SimpleFileOptions::default()).unwrap();
        zw.write_all(body).unwrap();
    }
    zw.finish().unwrap();
    path
}

/// Minimal dBase III image. Fields are `(name, type, length)`; values are Latin-1 encoded and
/// space-padded.
pub fn dbf_image(fields: &[(&str, u8, u8)], records: &[Vec<&str>]) -> Vec<u8> {
    let header_len = 32 + fields.len() * 32 + 1;
    let record_len = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

    let mut out = vec![0u8; 32];
    out[0] = 0x03;
    out[4..8].copy_from_slice(&(records.len() as u32).to_le_bytes());
    out[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
    out[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());
    for (name, kind, len) in fields {
        let mut desc = [0u8; 32];
        desc[..name.len()].copy_from_slice(name.as_bytes());
        desc[11] = *kind;
        desc[16] = *len;
        out.extend_from_slice(&desc);
    }
    out.push(0x0D);
    for values in records {
        out.push(b' ');
        for ((_, _, len), v) in fields.iter().zip(values) {
            let mut cell = latin1(v);
            cell.resize(*len as usize, b' ');
            out.extend_from_slice(&cell);
        }
    }
    out.push(0x1A);
    out
}

/// Layout descriptor for `tb_procedimento`: code (1-10), name (11-30), value (31-38).
pub const PROCEDURE_LAYOUT: &str = "\
Coluna,Tamanho,Inicio,Fim,Tipo
CO_PROCEDIMENTO,10,1,10,VARCHAR2
NO_PROCEDIMENTO,20,11,30,VARCHAR2
VL_SH,8,31,38,NUMBER
";

/// Two fixed-width records matching [`PROCEDURE_LAYOUT`].
pub const PROCEDURE_DATA: &str = "\
0301010072CONSULTA MEDICA        12.50
0301010080ATENDIMENTO URGENCIA   10.00
";
