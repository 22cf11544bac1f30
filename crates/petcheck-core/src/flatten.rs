//! Flatten nested JSON into dotted-path keys
//!
//! `{"category": {"id": 2}, "tags": [{"name": "a"}]}` becomes
//! `{"category.id": 2, "tags.0.name": "a"}`. Only leaves produce entries:
//! empty objects and arrays vanish from the flattened view.

use serde_json::{Map, Value};

/// Flatten `value` into an insertion-ordered map of path → leaf.
///
/// A primitive at the root is recorded under the empty key.
/// Distinct paths that render to the same string (`{"a.b": 1, "a": {"b": 2}}`)
/// collapse into one entry holding the later leaf.
#[must_use]
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    walk(value, None, &mut out);
    out
}

fn walk(value: &Value, prefix: Option<&str>, out: &mut Map<String, Value>) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                walk(child, Some(&join(prefix, key)), out);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                walk(child, Some(&join(prefix, &idx.to_string())), out);
            }
        }
        leaf => {
            out.insert(prefix.unwrap_or_default().to_string(), leaf.clone());
        }
    }
}

fn join(prefix: Option<&str>, segment: &str) -> String {
    match prefix {
        Some(p) => format!("{p}.{segment}"),
        None => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn nested_object_and_array() {
        let v = json!({
            "id": 1,
            "category": {"id": 2, "name": "dog"},
            "tags": [{"id": 3, "name": "good"}],
            "photoUrls": ["a", "b"]
        });
        let flat = flatten(&v);
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "category.id",
                "category.name",
                "tags.0.id",
                "tags.0.name",
                "photoUrls.0",
                "photoUrls.1",
            ]
        );
        assert_eq!(flat["category.name"], json!("dog"));
        assert_eq!(flat["photoUrls.1"], json!("b"));
    }

    #[test]
    fn empty_containers_vanish() {
        let v = json!({"id": 1, "tags": [], "category": {}});
        let flat = flatten(&v);
        assert_eq!(flat.len(), 1);
        assert!(!flat.contains_key("tags"));
        assert!(!flat.contains_key("category"));
    }

    #[test]
    fn null_is_a_leaf() {
        let flat = flatten(&json!({"category": null}));
        assert_eq!(flat["category"], Value::Null);
    }

    #[test]
    fn root_array_uses_bare_index() {
        let flat = flatten(&json!([{"id": 7}, {"id": 8}]));
        assert_eq!(flat["0.id"], json!(7));
        assert_eq!(flat["1.id"], json!(8));
    }

    #[test]
    fn root_primitive_uses_empty_key() {
        let flat = flatten(&json!("plain text"));
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[""], json!("plain text"));
    }

    #[test]
    fn input_is_untouched() {
        let v = json!({"a": {"b": [1, 2]}});
        let before = v.clone();
        let _ = flatten(&v);
        assert_eq!(v, before);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn count_leaves(v: &Value) -> usize {
        match v {
            Value::Object(obj) => obj.values().map(count_leaves).sum(),
            Value::Array(items) => items.iter().map(count_leaves).sum(),
            _ => 1,
        }
    }

    proptest! {
        // Keys are lowercase letters only, so no two leaf paths can collide.
        #[test]
        fn one_entry_per_leaf(v in arb_json()) {
            prop_assert_eq!(flatten(&v).len(), count_leaves(&v));
        }

        #[test]
        fn flattening_is_a_fixed_point(v in prop::collection::btree_map("[a-z]{1,4}", arb_json(), 1..5)) {
            let root = Value::Object(v.into_iter().collect());
            let once = flatten(&root);
            let twice = flatten(&Value::Object(once.clone()));
            prop_assert_eq!(once, twice);
        }
    }
}
