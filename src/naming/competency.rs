//! Competency (`AAAAMM` batch period) extraction from paths and file stems.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::identifier::sanitize_identifier;

// Patterns in priority order: a 20xx year with a plausible month digit first, any 6 digits after.
static COMPETENCY_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"20\d{2}[01]\d").expect("valid regex"),
        Regex::new(r"\d{6}").expect("valid regex"),
    ]
});

static COMPETENCY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)_(\d{6})$").expect("valid regex"));

const LAYOUT_SUFFIX: &str = "_layout";

/// A validated year-month tag: six ASCII digits whose last two form a month in `01..=12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Competency(String);

impl Competency {
    /// Validate a candidate tag.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let month: u8 = raw[4..].parse().ok()?;
        (1..=12).contains(&month).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Competency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find a competency tag anywhere in `path`.
///
/// Every match of the preferred `20xx` pattern is tried before falling back to any run of six
/// digits; the first match whose month validates wins.
pub fn detect_competency(path: &str) -> Option<Competency> {
    COMPETENCY_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(path))
        .find_map(|m| Competency::parse(m.as_str()))
}

/// Remove a trailing `_AAAAMM` from a file stem when its month is valid.
///
/// `producao_202301` becomes `producao`; `producao_202313` and `producao` are returned as-is.
pub fn strip_competency_suffix(stem: &str) -> &str {
    match COMPETENCY_SUFFIX.captures(stem) {
        Some(caps) if Competency::parse(&caps[2]).is_some() => {
            caps.get(1).map_or(stem, |m| m.as_str())
        }
        _ => stem,
    }
}

/// True when a file stem names a layout descriptor (`..._layout`, any case).
pub fn is_layout_stem(stem: &str) -> bool {
    stem.to_ascii_lowercase().ends_with(LAYOUT_SUFFIX)
}

/// Base table key of a layout descriptor stem.
///
/// Strips `_layout`, then a competency suffix, then sanitizes: `TB_Proc_202301_layout`
/// becomes `tb_proc`.
pub fn layout_base_key(stem: &str) -> String {
    let lower = stem.to_ascii_lowercase();
    let base = lower.strip_suffix(LAYOUT_SUFFIX).unwrap_or(&lower);
    sanitize_identifier(strip_competency_suffix(base))
}

/// Base table key a data file stem looks up layouts with.
pub fn data_base_key(stem: &str) -> String {
    sanitize_identifier(strip_competency_suffix(stem))
}
