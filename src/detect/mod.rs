//! Leaf detectors for unknown input files: byte encoding and field delimiter.
//!
//! Both detectors are total. They degrade to a safe default instead of failing.

pub mod delimiter;
pub mod encoding;

pub use delimiter::{detect_delimiter, parse_delimiter, DEFAULT_DELIMITER, DELIMITER_CANDIDATES};
pub use encoding::{
    decode_text, detect_encoding, detect_encoding_with, encoding_for_label, fallback_encoding,
    sample_file, EncodingStrategy, SAMPLE_BYTES,
};
