//! Field delimiter detection.

/// Candidate delimiters in tie-break priority order.
pub const DELIMITER_CANDIDATES: [u8; 4] = [b'|', b';', b',', b'\t'];

/// Delimiter assumed when no candidate appears in the sample.
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Most frequent candidate delimiter in `sample`.
///
/// Ties go to the earliest candidate in [`DELIMITER_CANDIDATES`]; a sample with no candidate at
/// all yields [`DEFAULT_DELIMITER`].
pub fn detect_delimiter(sample: &str) -> u8 {
    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    for b in sample.bytes() {
        if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&c| c == b) {
            counts[i] += 1;
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }

    if counts[best] == 0 {
        DEFAULT_DELIMITER
    } else {
        DELIMITER_CANDIDATES[best]
    }
}

/// Parse a user-supplied delimiter (`|`, `;`, `,`, `\t` or the word `tab`).
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" | "TAB" | "\t" => Some(b'\t'),
        s if s.len() == 1 => s.bytes().next(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_separated_text() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), b'|');
    }

    #[test]
    fn no_candidate_defaults_to_pipe() {
        assert_eq!(detect_delimiter("just words\nand more words"), b'|');
        assert_eq!(detect_delimiter(""), b'|');
    }

    #[test]
    fn highest_count_wins() {
        assert_eq!(detect_delimiter("a;b;c\n1;2,5;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
    }

    #[test]
    fn ties_follow_candidate_order() {
        assert_eq!(detect_delimiter("a;b,c"), b';');
        assert_eq!(detect_delimiter("a,b|c"), b'|');
        assert_eq!(detect_delimiter("a,b\tc"), b',');
    }

    #[test]
    fn parses_user_delimiters() {
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("\\t"), Some(b'\t'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("||"), None);
    }
}
