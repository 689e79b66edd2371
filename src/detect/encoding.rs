//! Text encoding detection.
//!
//! Detection always yields a usable [`Encoding`]: the statistical detector returns its best
//! guess, and the fallback chain ends in Latin-1, which decodes any byte sequence.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde::Serialize;

/// Number of leading bytes sampled from a file for encoding/delimiter detection.
pub const SAMPLE_BYTES: u64 = 100_000;

/// How [`detect_encoding_with`] picks an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EncodingStrategy {
    /// Byte-frequency detection (`chardetng`).
    #[default]
    Statistical,
    /// Ordered trial decode: UTF-8, then Latin-1.
    Fallback,
}

/// Best-guess encoding for a byte sample using the statistical detector.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    detect_encoding_with(sample, EncodingStrategy::Statistical)
}

/// Best-guess encoding for a byte sample using the given strategy.
///
/// A byte-order mark always wins. Never fails.
pub fn detect_encoding_with(sample: &[u8], strategy: EncodingStrategy) -> &'static Encoding {
    if let Some((enc, _)) = Encoding::for_bom(sample) {
        return enc;
    }
    match strategy {
        EncodingStrategy::Statistical => {
            let mut detector = EncodingDetector::new();
            detector.feed(without_partial_utf8_tail(sample), true);
            detector.guess(None, true)
        }
        EncodingStrategy::Fallback => fallback_encoding(sample),
    }
}

/// UTF-8 if the sample decodes cleanly, otherwise Latin-1.
///
/// `encoding_rs` decodes the Latin-1 label as windows-1252, so a third candidate would never be
/// reached.
pub fn fallback_encoding(sample: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(without_partial_utf8_tail(sample)).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

/// Resolve a user-supplied label such as `utf-8`, `latin1`, `latin-1` or `cp1252`.
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    Encoding::for_label(label.as_bytes())
        .or_else(|| Encoding::for_label(label.replace(['-', '_'], "").as_bytes()))
}

/// Read up to [`SAMPLE_BYTES`] from the start of a file.
pub fn sample_file(path: &Path) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    File::open(path)?.take(SAMPLE_BYTES).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Decode bytes into an owned string; malformed sequences become U+FFFD.
pub fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

// A sample cut mid-character must not disqualify UTF-8.
fn without_partial_utf8_tail(sample: &[u8]) -> &[u8] {
    match std::str::from_utf8(sample) {
        Err(e) if e.error_len().is_none() => &sample[..e.valid_up_to()],
        _ => sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_text_is_detected_as_utf8() {
        let sample = "código|descrição|situação\n01|Consulta médica|ativo\n".as_bytes();
        assert_eq!(detect_encoding(sample), UTF_8);
        assert_eq!(fallback_encoding(sample), UTF_8);
    }

    #[test]
    fn latin1_bytes_decode_through_detected_encoding() {
        let sample: &[u8] = b"nome;descri\xe7\xe3o\n\
            Jos\xe9;Consulta m\xe9dica em aten\xe7\xe3o b\xe1sica\n\
            Ant\xf4nio;Procedimento cir\xfargico de urg\xeancia\n\
            Concei\xe7\xe3o;Aten\xe7\xe3o domiciliar e reabilita\xe7\xe3o\n";
        let enc = detect_encoding(sample);
        assert_ne!(enc, UTF_8);
        assert!(decode_text(sample, enc).contains("José"));
        assert_eq!(fallback_encoding(sample), WINDOWS_1252);
    }

    #[test]
    fn truncated_utf8_sample_still_counts_as_utf8() {
        let full = "ação".as_bytes();
        let cut = &full[..full.len() - 1];
        assert_eq!(fallback_encoding(cut), UTF_8);
    }

    #[test]
    fn detection_is_total() {
        for sample in [&b""[..], &[0xff, 0xfe, 0x00][..], &[0x80; 64][..], b"plain ascii"] {
            let _ = detect_encoding(sample);
            let _ = detect_encoding_with(sample, EncodingStrategy::Fallback);
        }
    }

    #[test]
    fn bom_overrides_statistics() {
        assert_eq!(detect_encoding(b"\xef\xbb\xbfa;b\n"), UTF_8);
    }

    #[test]
    fn labels_accept_common_spellings() {
        assert_eq!(encoding_for_label("latin-1"), Some(WINDOWS_1252));
        assert_eq!(encoding_for_label("cp1252"), Some(WINDOWS_1252));
        assert_eq!(encoding_for_label("UTF-8"), Some(UTF_8));
        assert_eq!(encoding_for_label("klingon"), None);
    }
}
