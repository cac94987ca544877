//! Dot-path lookup into nested configuration trees.

use serde_json::Value;

/// Resolve a dotted key such as `"constants.apis.spike"` against `root`.
///
/// Returns `None` as soon as a segment is missing or the current node is not
/// an object. Never panics, whatever the input.
pub fn resolve_dot_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Like [`resolve_dot_path`], returning a clone of the value or `default`.
///
/// An explicit `null` at the end of the path is a present value and is
/// returned as-is.
pub fn resolve_dot_path_or(root: &Value, key: &str, default: Value) -> Value {
    resolve_dot_path(root, key).cloned().unwrap_or(default)
}

/// String convenience used by consumers reading URL fragments.
pub fn resolve_dot_path_str<'a>(root: &'a Value, key: &str) -> Option<&'a str> {
    resolve_dot_path(root, key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_nested_value() {
        let root = json!({"a": {"b": {"c": 5}}});
        assert_eq!(resolve_dot_path_or(&root, "a.b.c", json!(0)), json!(5));
        assert_eq!(resolve_dot_path(&root, "a.b"), Some(&json!({"c": 5})));
    }

    #[test]
    fn test_missing_segment_returns_default() {
        let root = json!({"a": {}});
        assert_eq!(resolve_dot_path_or(&root, "a.b.c", json!(0)), json!(0));
    }

    #[test]
    fn test_non_object_segment_returns_default() {
        let root = json!({"a": {"b": "leaf", "list": [1, 2]}});
        assert_eq!(resolve_dot_path_or(&root, "a.b.c", json!("d")), json!("d"));
        assert_eq!(resolve_dot_path_or(&root, "a.list.0", json!(-1)), json!(-1));
    }

    #[test]
    fn test_root_not_an_object() {
        assert_eq!(resolve_dot_path(&json!(42), "a"), None);
        assert_eq!(resolve_dot_path(&Value::Null, "a.b"), None);
    }

    #[test]
    fn test_odd_keys_never_panic() {
        let root = json!({"": {"": 1}, "a": {"b": 2}});
        assert_eq!(resolve_dot_path(&root, ""), Some(&json!({"": 1})));
        assert_eq!(resolve_dot_path(&root, "."), Some(&json!(1)));
        assert_eq!(resolve_dot_path(&root, "a..b"), None);
        assert_eq!(resolve_dot_path(&root, "a.b."), None);
    }

    #[test]
    fn test_explicit_null_is_returned() {
        let root = json!({"a": {"b": null}});
        assert_eq!(resolve_dot_path_or(&root, "a.b", json!(1)), Value::Null);
    }

    #[test]
    fn test_str_accessor() {
        let root = json!({"constants": {"apis": {"spike": "/api/spike/"}}});
        assert_eq!(
            resolve_dot_path_str(&root, "constants.apis.spike"),
            Some("/api/spike/")
        );
        assert_eq!(resolve_dot_path_str(&root, "constants.apis"), None);
    }
}
