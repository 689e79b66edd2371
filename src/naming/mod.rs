//! Identifier normalization and competency tagging.
//!
//! Every table and column name the crate places in SQL passes through
//! [`sanitize_identifier`] first.

pub mod competency;
pub mod identifier;

pub use competency::{
    data_base_key, detect_competency, is_layout_stem, layout_base_key, strip_competency_suffix,
    Competency,
};
pub use identifier::{
    identifier_or_placeholder, quote_identifier, sanitize_identifier, MAX_IDENTIFIER_LEN,
};
