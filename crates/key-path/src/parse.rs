//! Parsing, formatting and path relationships.

use crate::{KeyPathError, SEPARATOR};

/// Parse a dot-delimited key path into segments.
///
/// A path without a separator is a single verbatim key. Otherwise every
/// segment is trimmed and must be non-empty, so `"a..c"` and `"a. "` are
/// rejected.
///
/// # Example
///
/// ```
/// use class_base_key_path::{parse_key_path, KeyPathError};
///
/// assert_eq!(parse_key_path("name").unwrap(), vec!["name"]);
/// assert_eq!(parse_key_path(" svg . width ").unwrap(), vec!["svg", "width"]);
/// assert_eq!(
///     parse_key_path("a..c"),
///     Err(KeyPathError::EmptySegment { index: 1 })
/// );
/// ```
pub fn parse_key_path(path: &str) -> Result<Vec<String>, KeyPathError> {
    // "" never addresses the `""` key.
    if path.is_empty() {
        return Err(KeyPathError::Empty);
    }
    if !path.contains(SEPARATOR) {
        return Ok(vec![path.to_string()]);
    }
    path.split(SEPARATOR)
        .enumerate()
        .map(|(index, segment)| {
            let segment = segment.trim();
            if segment.is_empty() {
                Err(KeyPathError::EmptySegment { index })
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

/// Join segments back into a dot-delimited path.
///
/// ```
/// use class_base_key_path::format_key_path;
///
/// assert_eq!(format_key_path(&[]), "");
/// assert_eq!(format_key_path(&["a".to_string(), "b".to_string()]), "a.b");
/// ```
pub fn format_key_path(path: &[String]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(segment);
    }
    out
}
