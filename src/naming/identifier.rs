//! Storage identifier normalization.

/// Maximum identifier length accepted by MySQL.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Normalize an arbitrary string into a storage identifier.
///
/// Lower-cases, collapses every run of characters outside `[a-z0-9]` (underscores included)
/// into one `_`, trims underscores at both ends and caps the length at
/// [`MAX_IDENTIFIER_LEN`]. The result only ever contains `[a-z0-9_]` and may be empty.
///
/// Idempotent: `sanitize_identifier(&sanitize_identifier(s)) == sanitize_identifier(s)`.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_IDENTIFIER_LEN));
    let mut pending_sep = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
            if out.len() >= MAX_IDENTIFIER_LEN {
                break;
            }
        } else {
            pending_sep = true;
        }
    }

    // The cap can land right after a separator.
    out.truncate(MAX_IDENTIFIER_LEN);
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Sanitized identifier, or `col_{ordinal}` when nothing usable is left.
pub fn identifier_or_placeholder(raw: &str, ordinal: usize) -> String {
    let name = sanitize_identifier(raw);
    if name.is_empty() {
        format!("col_{ordinal}")
    } else {
        name
    }
}

/// Quote an identifier for interpolation into MySQL statements.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
