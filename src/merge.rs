//! Shallow merging of keyed configuration objects.

/// Merges `overlay` into `base`, one level deep.
///
/// Keys present in both take the overlay's value; keys only in `base`
/// survive untouched. Nested values are replaced wholesale, not merged.
///
/// Works for any map that can be extended with its own entries, which
/// covers both `serde_json::Map` and `BTreeMap`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use telemetry_configuration::merge_shallow;
///
/// let base = json!({ "endpoint": "a", "timeout": 10 });
/// let overlay = json!({ "timeout": 30, "headers": { "x": 1 } });
///
/// let merged = merge_shallow(
///     base.as_object().cloned().unwrap(),
///     overlay.as_object().cloned().unwrap(),
/// );
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({ "endpoint": "a", "timeout": 30, "headers": { "x": 1 } })
/// );
/// ```
#[must_use]
pub fn merge_shallow<M, I>(mut base: M, overlay: I) -> M
where
    M: Extend<I::Item>,
    I: IntoIterator,
{
    base.extend(overlay);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};
    use std::collections::BTreeMap;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn overlay_wins_on_overlapping_keys() {
        let merged = merge_shallow(
            object(json!({ "endpoint": "a" })),
            object(json!({ "endpoint": "b" })),
        );
        assert_eq!(merged.get("endpoint"), Some(&json!("b")));
    }

    #[test]
    fn base_keys_survive_when_not_overlaid() {
        let merged = merge_shallow(
            object(json!({ "endpoint": "a" })),
            object(json!({ "headers": { "x": 1 } })),
        );
        assert_eq!(
            Value::Object(merged),
            json!({ "endpoint": "a", "headers": { "x": 1 } })
        );
    }

    #[test]
    fn nested_objects_are_replaced_not_merged() {
        let merged = merge_shallow(
            object(json!({ "headers": { "a": 1 } })),
            object(json!({ "headers": { "b": 2 } })),
        );
        assert_eq!(merged.get("headers"), Some(&json!({ "b": 2 })));
    }

    #[test]
    fn empty_overlay_is_identity() {
        let base = object(json!({ "endpoint": "a" }));
        let merged = merge_shallow(base.clone(), Map::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn works_with_btree_maps() {
        let base = BTreeMap::from([("gc", false), ("heap", false)]);
        let merged = merge_shallow(base, [("heap", true)]);
        assert_eq!(merged, BTreeMap::from([("gc", false), ("heap", true)]));
    }
}
