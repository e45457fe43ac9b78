use serde_json::Value;

/// Get a value from a JSON tree by key path.
///
/// Returns `None` as soon as a segment is missing or the current node is
/// not an object. The empty path returns the root.
///
/// # Example
///
/// ```
/// use class_base_key_path::get;
/// use serde_json::json;
///
/// let doc = json!({"svg": {"width": 800, "ticks": [1, 2]}});
/// assert_eq!(get(&doc, &["svg".into(), "width".into()]), Some(&json!(800)));
/// assert_eq!(get(&doc, &["svg".into(), "ticks".into(), "0".into()]), None);
/// ```
pub fn get<'a>(val: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        match current {
            Value::Object(map) => current = map.get(step)?,
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_root() {
        let doc = json!({"a": 1});
        assert_eq!(get(&doc, &[]), Some(&doc));
    }

    #[test]
    fn test_get_nested() {
        let doc = json!({"foo": {"bar": {"baz": "qux"}}});
        assert_eq!(get(&doc, &segs(&["foo", "bar", "baz"])), Some(&json!("qux")));
        assert_eq!(get(&doc, &segs(&["foo", "bar"])), Some(&json!({"baz": "qux"})));
        assert_eq!(get(&doc, &segs(&["foo", "missing"])), None);
    }

    #[test]
    fn test_get_falsy_values_are_present() {
        let doc = json!({"n": 0, "s": "", "b": false, "z": null});
        assert_eq!(get(&doc, &segs(&["n"])), Some(&json!(0)));
        assert_eq!(get(&doc, &segs(&["s"])), Some(&json!("")));
        assert_eq!(get(&doc, &segs(&["b"])), Some(&json!(false)));
        assert_eq!(get(&doc, &segs(&["z"])), Some(&Value::Null));
    }

    #[test]
    fn test_get_does_not_walk_leaves() {
        let doc = json!({"list": [{"a": 1}], "text": "abc"});
        assert_eq!(get(&doc, &segs(&["list", "0"])), None);
        assert_eq!(get(&doc, &segs(&["text", "length"])), None);
    }
}
