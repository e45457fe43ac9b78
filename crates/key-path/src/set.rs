use serde_json::{Map, Value};

use crate::{format_key_path, KeyPathError};

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Missing (or `null`) intermediate nodes become empty objects. An
/// intermediate node holding any other non-object value rejects the write
/// and leaves the tree untouched. Returns the value previously stored at
/// `path`, if any.
///
/// # Errors
///
/// - [`KeyPathError::Empty`] for the empty path.
/// - [`KeyPathError::NotObject`] when the root or an intermediate node is
///   not an object.
///
/// # Example
///
/// ```
/// use class_base_key_path::{set, KeyPathError};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set(&mut doc, &["book".into(), "name".into()], json!("tom")).unwrap();
/// set(&mut doc, &["book".into(), "price".into()], json!(15)).unwrap();
/// assert_eq!(doc, json!({"book": {"name": "tom", "price": 15}}));
///
/// let err = set(&mut doc, &["book".into(), "price".into(), "usd".into()], json!(1));
/// assert_eq!(err, Err(KeyPathError::NotObject { path: "book.price".into() }));
/// ```
pub fn set(root: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, KeyPathError> {
    let (last, parents) = path.split_last().ok_or(KeyPathError::Empty)?;

    let mut current = root;
    for (depth, step) in parents.iter().enumerate() {
        current = match current {
            Value::Object(map) => {
                let slot = map
                    .entry(step.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if slot.is_null() {
                    *slot = Value::Object(Map::new());
                }
                slot
            }
            _ => {
                return Err(KeyPathError::NotObject {
                    path: format_key_path(&parents[..depth]),
                })
            }
        };
    }

    match current {
        Value::Object(map) => Ok(map.insert(last.clone(), value)),
        _ => Err(KeyPathError::NotObject {
            path: format_key_path(parents),
        }),
    }
}
