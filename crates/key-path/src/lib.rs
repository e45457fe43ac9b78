//! Dot-delimited key paths over a JSON tree.
//!
//! A key path such as `"book.author.name"` addresses a location inside a
//! nested JSON object. Only objects are traversed: arrays and scalars are
//! leaves, never walked into.
//!
//! # Example
//!
//! ```
//! use class_base_key_path::{get, parse_key_path, set, KeyPath};
//! use serde_json::json;
//!
//! let path = parse_key_path("book. name").unwrap();
//! assert_eq!(path, vec!["book".to_string(), "name".to_string()]);
//!
//! let mut doc = json!({});
//! set(&mut doc, &path, json!("tom")).unwrap();
//! assert_eq!(get(&doc, &path), Some(&json!("tom")));
//!
//! let path: KeyPath = "a.b.c".parse().unwrap();
//! let bubble: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
//! assert_eq!(bubble, vec!["a.b.c", "a.b", "a"]);
//! ```

use thiserror::Error;

pub mod get;
pub mod parse;
pub mod set;
pub mod types;

pub use get::get;
pub use parse::{format_key_path, parse_key_path};
pub use set::set;
pub use types::{Ancestors, KeyPath, Path, PathStep};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyPathError {
    #[error("empty key path")]
    Empty,
    #[error("empty segment at position {index}")]
    EmptySegment { index: usize },
    #[error("`{path}` is not an object")]
    NotObject { path: String },
}
