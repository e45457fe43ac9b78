//! Type definitions for key paths.

use std::fmt;
use std::str::FromStr;

use crate::{format_key_path, parse_key_path, KeyPathError};

/// A single segment of a key path (an object key).
pub type PathStep = String;

/// A parsed key path.
pub type Path = Vec<PathStep>;

/// A validated, non-empty key path.
///
/// Formats back to its canonical dot-joined form, with segments trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Path,
}

impl KeyPath {
    pub fn parse(path: &str) -> Result<Self, KeyPathError> {
        parse_key_path(path).map(|segments| Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    /// This path followed by each ancestor, deepest first.
    ///
    /// ```
    /// use class_base_key_path::KeyPath;
    ///
    /// let path = KeyPath::parse("library.book.name").unwrap();
    /// let chain: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
    /// assert_eq!(chain, ["library.book.name", "library.book", "library"]);
    /// ```
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            segments: &self.segments,
            len: self.segments.len(),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_key_path(&self.segments))
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[String]> for KeyPath {
    fn as_ref(&self) -> &[String] {
        &self.segments
    }
}

/// Iterator over a path and its ancestors, see [`KeyPath::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    segments: &'a [String],
    len: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = KeyPath;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let item = KeyPath {
            segments: self.segments[..self.len].to_vec(),
        };
        self.len -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl ExactSizeIterator for Ancestors<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical() {
        let path: KeyPath = " a . b ".parse().unwrap();
        assert_eq!(path.to_string(), "a.b");
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_single_key_ancestors() {
        let path = KeyPath::parse("on").unwrap();
        let chain: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(chain, vec!["on"]);
    }

    #[test]
    fn test_ancestors_len() {
        let path = KeyPath::parse("a.b.c.d").unwrap();
        assert_eq!(path.ancestors().len(), 4);
    }

    #[test]
    fn test_invalid() {
        assert!("a..b".parse::<KeyPath>().is_err());
        assert!("".parse::<KeyPath>().is_err());
    }
}
