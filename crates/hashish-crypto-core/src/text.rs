//! Line grammar shared by descriptor files and test-vector files.
//!
//! Both formats are a header line followed by `identifier : value` lines.
//! Leading spaces are insignificant, and a line whose first non-space
//! character is `#` is a comment.

use crate::error::CryptoError;

/// Strip leading spaces; comments become empty.
#[must_use]
pub fn isolate_content(line: &str) -> &str {
    let line = line.trim_start_matches(' ');
    if line.starts_with('#') {
        ""
    } else {
        line
    }
}

/// Iterate over the meaningful lines of `text`, skipping blanks and comments.
pub fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(isolate_content).filter(|line| !line.is_empty())
}

/// Parse an unsigned integer field.
///
/// # Errors
///
/// Returns `CryptoError::MalformedInput` naming `field` if `value` is not a
/// decimal integer in range.
pub fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, CryptoError> {
    value
        .trim_end()
        .parse()
        .map_err(|_| CryptoError::MalformedInput(format!("{field}: not a number: {value:?}")))
}

/// Parse a `true`/`false` field.
///
/// # Errors
///
/// Returns `CryptoError::MalformedInput` naming `field` for anything else.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, CryptoError> {
    match value.trim_end() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(CryptoError::MalformedInput(format!(
            "{field}: expected true or false, got {other:?}"
        ))),
    }
}
