//! Deep merge functionality for JSON/YAML configuration trees.
//!
//! Objects merge key by key with the later value winning. Arrays are replaced
//! entirely, never concatenated.

use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// This is the settings-file variant; see [`deep_merge_overlay`] for the
/// in-place merge used on the composed configuration tree.
///
/// # Example
/// ```
/// use serde_json::json;
/// use tierkit::config::deep_merge;
///
/// let base = json!({
///     "forms": { "base": "forms", "engine": "formly" },
///     "tags": ["a", "b"]
/// });
/// let overlay = json!({
///     "forms": { "engine": "json_forms" },
///     "tags": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result["forms"]["base"], "forms");
/// assert_eq!(result["forms"]["engine"], "json_forms");
/// assert_eq!(result["tags"], json!(["c"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
///
/// Equivalent to folding `deep_merge` over the list.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

/// Recursively merge `source` into `target` in place.
///
/// When a key holds an object on both sides the merge recurses; in every
/// other case the source value replaces the target value wholesale. Arrays
/// and explicit nulls in `source` replace what was there.
pub fn deep_merge_overlay(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                let both_objects = source_value.is_object()
                    && target_map.get(&key).is_some_and(Value::is_object);
                if both_objects {
                    if let Some(existing) = target_map.get_mut(&key) {
                        deep_merge_overlay(existing, source_value);
                    }
                } else {
                    target_map.insert(key, source_value);
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_simple_objects() {
        let base = json!({"a": 1, "b": 2});
        let overlay = json!({"b": 3, "c": 4});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let base = json!({"items": [1, 2, 3]});
        let overlay = json!({"items": [4, 5]});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"items": [4, 5]}));
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"a": null, "b": {"c": null}});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn test_merge_all() {
        let values = vec![json!({"a": 1}), json!({"b": 2}), json!({"a": 3, "c": 4})];
        let result = deep_merge_all(values);
        assert_eq!(result, json!({"a": 3, "b": 2, "c": 4}));
    }

    #[test]
    fn test_overlay_recurses_into_nested_objects() {
        let mut target = json!({
            "constants": {
                "apis": {"spike": "/api/spike/", "users": "/api/users/"},
                "assets": {"images": "/assets/core/images/"}
            }
        });
        deep_merge_overlay(
            &mut target,
            json!({"constants": {"apis": {"spike": "https://remote/api/spike/"}}}),
        );
        assert_eq!(
            target,
            json!({
                "constants": {
                    "apis": {"spike": "https://remote/api/spike/", "users": "/api/users/"},
                    "assets": {"images": "/assets/core/images/"}
                }
            })
        );
    }

    #[test]
    fn test_overlay_disjoint_keys_are_added() {
        let mut target = json!({"a": 1, "nested": {"x": true}});
        deep_merge_overlay(&mut target, json!({"b": 2, "other": {"y": false}}));
        assert_eq!(
            target,
            json!({"a": 1, "nested": {"x": true}, "b": 2, "other": {"y": false}})
        );
    }

    #[test]
    fn test_overlay_is_idempotent() {
        let source = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        let mut once = json!({"a": {"b": 0, "e": 5}});
        deep_merge_overlay(&mut once, source.clone());
        let mut twice = once.clone();
        deep_merge_overlay(&mut twice, source);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_overlay_replaces_arrays_and_mismatched_kinds() {
        let mut target = json!({"list": [1, 2, 3], "value": {"nested": true}, "flag": 1});
        deep_merge_overlay(
            &mut target,
            json!({"list": [9], "value": 42, "flag": {"on": true}}),
        );
        assert_eq!(target, json!({"list": [9], "value": 42, "flag": {"on": true}}));
    }

    #[test]
    fn test_overlay_null_overwrites() {
        let mut target = json!({"a": 1});
        deep_merge_overlay(&mut target, json!({"a": null}));
        assert_eq!(target, json!({"a": null}));
    }
}
