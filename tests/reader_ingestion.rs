mod common;

use encoding_rs::{UTF_8, WINDOWS_1252};
use sigtap_loader::detect::{detect_delimiter, EncodingStrategy};
use sigtap_loader::ingestion::delimited::{read_delimited, read_delimited_from_reader};
use sigtap_loader::ingestion::{read_path, read_source, ParseStrategy, ReadOptions};
use sigtap_loader::layout::{read_layout_file, LayoutPosition, TableLayout};
use sigtap_loader::types::{ColumnType, Value};

use common::{dbf_image, latin1, write_file, PROCEDURE_DATA, PROCEDURE_LAYOUT};

#[test]
fn delimited_file_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "dados.txt", latin1("cod,nome\n1,Ação\n"));

    let options = ReadOptions {
        delimiter: Some(b','),
        encoding: Some(WINDOWS_1252),
        ..Default::default()
    };
    let ds = read_delimited(&path, &options).unwrap();
    assert_eq!(ds.get(0, "nome"), Some(&Value::text("Ação")));
}

#[test]
fn delimited_file_with_bom_and_quoted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "dados.csv",
        "\u{feff}id;descricao\n1;\"contém; ponto e vírgula\"\n",
    );

    let ds = read_delimited(&path, &ReadOptions::default()).unwrap();
    let names: Vec<&str> = ds.schema.field_names().collect();
    assert_eq!(names, ["id", "descricao"]);
    assert_eq!(ds.get(0, "descricao"), Some(&Value::text("contém; ponto e vírgula")));
}

#[test]
fn delimited_from_existing_reader() {
    let input = "A\tB\nx\ty\n";
    assert_eq!(detect_delimiter(input), b'\t');
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let ds = read_delimited_from_reader(&mut rdr).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::text("x"), Value::text("y")]]);
}

#[test]
fn fallback_encoding_strategy_reads_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "utf8.csv", "nome|uf\nSão João|PB\n");

    let options = ReadOptions {
        encoding_strategy: EncodingStrategy::Fallback,
        ..Default::default()
    };
    let ds = read_delimited(&path, &options).unwrap();
    assert_eq!(ds.get(0, "nome"), Some(&Value::text("São João")));

    let forced = ReadOptions {
        encoding: Some(UTF_8),
        ..Default::default()
    };
    assert_eq!(read_delimited(&path, &forced).unwrap(), ds);
}

#[test]
fn layout_file_drives_fixed_width_reads() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = write_file(dir.path(), "tb_procedimento_layout.csv", PROCEDURE_LAYOUT);
    let data_path = write_file(dir.path(), "tb_procedimento.txt", PROCEDURE_DATA);

    let layout = read_layout_file(&layout_path, &ReadOptions::default()).unwrap();
    assert_eq!(layout.len(), 3);
    assert_eq!(layout.columns[2].column_type, ColumnType::Decimal { precision: 8, scale: 0 });
    assert_eq!(
        layout.positions[1],
        LayoutPosition::new("no_procedimento", Some(11), Some(30))
    );

    let ds = read_source(
        &data_path,
        ParseStrategy::FixedWidth,
        Some(&layout),
        &ReadOptions::default(),
    )
    .unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::text("0301010072"),
            Value::text("CONSULTA MEDICA"),
            Value::text("12.50"),
        ]
    );
}

#[test]
fn fixed_width_without_layout_reads_delimited() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "x.txt", "a;b\n1;2\n");

    let ds = read_source(&path, ParseStrategy::FixedWidth, None, &ReadOptions::default()).unwrap();
    assert_eq!(ds.get(0, "b"), Some(&Value::text("2")));
}

#[test]
fn read_path_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();
    let dbf = write_file(
        dir.path(),
        "cbo.DBF",
        dbf_image(&[("CBO", b'C', 6), ("ATIVO", b'L', 1)], &[vec!["225125", "T"]]),
    );
    let ds = read_path(&dbf, None, &ReadOptions::default()).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::text("225125"), Value::text("True")]]);

    let layout = TableLayout {
        columns: Vec::new(),
        positions: vec![LayoutPosition::new("cbo", Some(1), Some(3))],
    };
    let txt = write_file(dir.path(), "cbo.txt", "225125\n");
    let ds = read_path(&txt, Some(&layout), &ReadOptions::default()).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::text("225")]]);

    assert!(read_path(dir.path().join("cbo.xls"), None, &ReadOptions::default()).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = read_delimited("does/not/exist.csv", &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, sigtap_loader::LoadError::Io(_)));
}
