//! Field-by-field merging of configuration tiers.
//!
//! Tiers are parsed into `serde_json::Value` and folded together, later tiers
//! winning. Lists are replaced, never concatenated.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// Objects merge recursively. Any other overlay value replaces the base
/// value, except `null`, which means "not specified" and keeps the base.
///
/// # Example
/// ```
/// use serde_json::json;
/// use task_manager::config::deep_merge;
///
/// let defaults = json!({ "server": { "host": "127.0.0.1", "port": 8000 } });
/// let project = json!({ "server": { "port": 9000 } });
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({ "server": { "host": "127.0.0.1", "port": 9000 } })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold `deep_merge` over tiers ordered lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
