//! Target table resolution for data files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{LoadError, LoadResult};
use crate::ingestion::ParseStrategy;
use crate::layout::TableLayout;
use crate::naming::{data_base_key, detect_competency, sanitize_identifier, Competency};

use super::discover::SourceFile;

/// Where and how a data file is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub table: String,
    pub competency: Option<Competency>,
    pub strategy: ParseStrategy,
    /// Base key of the governing layout, if any.
    pub layout: Option<String>,
}

impl Resolution {
    /// Whether a `competencia` column holding the tag is added to the data.
    pub fn tags_competency(&self) -> bool {
        self.layout.is_none() && self.competency.is_some()
    }
}

/// Competency of a file: `override_tag`, else the parent directory of its logical path, else the
/// whole logical path.
pub fn file_competency(logical_path: &Path, override_tag: Option<&Competency>) -> Option<Competency> {
    if let Some(tag) = override_tag {
        return Some(tag.clone());
    }
    logical_path
        .parent()
        .and_then(|p| detect_competency(&p.to_string_lossy()))
        .or_else(|| detect_competency(&logical_path.to_string_lossy()))
}

/// Table name of a file no layout governs: the sanitized stem, suffixed with `_{competency}`
/// unless it already ends with it.
pub fn plain_table_name(stem: &str, competency: Option<&Competency>) -> String {
    let base = sanitize_identifier(stem);
    match competency {
        Some(c) if !base.ends_with(&format!("_{c}")) => sanitize_identifier(&format!("{base}_{c}")),
        _ => base,
    }
}

/// Resolve a data file against the known layouts.
pub fn resolve_file(
    file: &SourceFile,
    layouts: &BTreeMap<String, TableLayout>,
    override_tag: Option<&Competency>,
) -> LoadResult<Resolution> {
    let unsupported = || LoadError::UnsupportedFormat {
        path: file.logical_path.clone(),
    };
    let stem = file.stem();
    let competency = file_competency(&file.logical_path, override_tag);

    let key = data_base_key(stem);
    let governed = !key.is_empty() && layouts.contains_key(&key);
    let format = file.format().ok_or_else(unsupported)?;
    let strategy = ParseStrategy::select(format, governed).ok_or_else(unsupported)?;

    let (table, layout) = if governed {
        (key.clone(), Some(key))
    } else {
        (plain_table_name(stem, competency.as_ref()), None)
    };
    if table.is_empty() {
        return Err(LoadError::Storage {
            message: format!("no usable table name in {}", file.logical_path.display()),
        });
    }

    Ok(Resolution {
        table,
        competency,
        strategy,
        layout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(logical: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(logical),
            logical_path: PathBuf::from(logical),
        }
    }

    fn comp(s: &str) -> Competency {
        Competency::parse(s).unwrap()
    }

    #[test]
    fn competency_prefers_override_then_parent() {
        let p = Path::new("/data/202301/tb_202305.txt");
        assert_eq!(file_competency(p, Some(&comp("199912"))), Some(comp("199912")));
        assert_eq!(file_competency(p, None), Some(comp("202301")));
        assert_eq!(
            file_competency(Path::new("/data/tb_202305.txt"), None),
            Some(comp("202305"))
        );
        assert_eq!(file_competency(Path::new("/data/tb.txt"), None), None);
    }

    #[test]
    fn plain_names_do_not_repeat_the_suffix() {
        assert_eq!(plain_table_name("producao_202301", Some(&comp("202301"))), "producao_202301");
        assert_eq!(plain_table_name("Producao", Some(&comp("202301"))), "producao_202301");
        assert_eq!(plain_table_name("producao", None), "producao");
    }

    #[test]
    fn layout_governs_matching_stems() {
        let mut layouts = BTreeMap::new();
        layouts.insert("producao".to_string(), TableLayout::default());

        let r = resolve_file(&file("/d/producao_202301.txt"), &layouts, None).unwrap();
        assert_eq!(r.table, "producao");
        assert_eq!(r.strategy, ParseStrategy::FixedWidth);
        assert_eq!(r.layout.as_deref(), Some("producao"));
        assert_eq!(r.competency, Some(comp("202301")));
        assert!(!r.tags_competency());

        let r = resolve_file(&file("/d/producao_202301.txt"), &BTreeMap::new(), None).unwrap();
        assert_eq!(r.table, "producao_202301");
        assert_eq!(r.strategy, ParseStrategy::Delimited);
        assert!(r.tags_competency());

        let r = resolve_file(&file("/d/PRODUCAO.DBF"), &layouts, None).unwrap();
        assert_eq!(r.table, "producao");
        assert_eq!(r.strategy, ParseStrategy::Dbf);
    }

    #[test]
    fn unusable_names_are_errors() {
        assert!(resolve_file(&file("/d/___.txt"), &BTreeMap::new(), None).is_err());
        assert!(resolve_file(&file("/d/notes.md"), &BTreeMap::new(), None).is_err());
    }
}
