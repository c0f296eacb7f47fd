//! Primitives over the data layer tree: dot-path access and deep defaults.
//!
//! Objects merge recursively. Arrays and scalars are atomic: a present value
//! is never merged with its default, only kept.

use serde_json::{Map, Value};
use tracing::warn;

/// How far past the end of an array a write may reach
pub const MAX_INDEX_GAP: usize = 100;

static NULL: Value = Value::Null;

/// Fill missing keys of `target` from `defaults`, recursing into objects.
///
/// Keys already present in `target` win, including explicit `null`s.
pub fn deep_defaults(target: &mut Value, defaults: &Value) {
    let (Value::Object(target), Value::Object(defaults)) = (target, defaults) else {
        return;
    };

    for (key, default) in defaults {
        match target.get_mut(key) {
            Some(existing) => deep_defaults(existing, default),
            None => {
                target.insert(key.clone(), default.clone());
            }
        }
    }
}

/// Read the value at a dot path (`page.pageInfo.pageName`, `items.0.name`)
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `value` at a dot path, creating intermediate containers.
///
/// Scalars in the way are replaced by containers. A numeric segment creates
/// an array when the parent does not exist yet. An index more than
/// [`MAX_INDEX_GAP`] past the end of its array is refused and the tree is
/// left untouched; returns whether the value was written.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    if !indices_fit(Some(root), &segments) {
        warn!(path = %path, "⚠️ Array index out of range, data layer write skipped");
        return false;
    }
    set_segments(root, &segments, value);
    true
}

// Walks the path the way `set_segments` would without writing. `None` is a
// container freshly inserted into an object.
fn indices_fit(node: Option<&Value>, segments: &[&str]) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return true;
    };
    let index = segment.parse::<usize>().ok();

    match (node, index) {
        (Some(Value::Array(items)), Some(i)) => {
            i <= items.len().saturating_add(MAX_INDEX_GAP)
                && indices_fit(Some(items.get(i).unwrap_or(&NULL)), rest)
        }
        (Some(Value::Object(map)), _) => indices_fit(map.get(*segment), rest),
        (Some(_), _) => indices_fit(None, rest),
        (None, Some(i)) => i <= MAX_INDEX_GAP && indices_fit(Some(&NULL), rest),
        (None, None) => indices_fit(None, rest),
    }
}

fn set_segments(node: &mut Value, segments: &[&str], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    let index = segment.parse::<usize>().ok();

    if !node.is_object() && !(node.is_array() && index.is_some()) {
        *node = Value::Object(Map::new());
    }

    let child = match node {
        Value::Array(items) => {
            let i = index.unwrap_or_default();
            let Some(len) = i.checked_add(1) else {
                return;
            };
            if items.len() < len {
                items.resize(len, Value::Null);
            }
            &mut items[i]
        }
        Value::Object(map) => map
            .entry(segment.to_string())
            .or_insert_with(|| empty_container(rest.first().copied())),
        _ => return,
    };

    set_segments(child, rest, value);
}

fn empty_container(next: Option<&str>) -> Value {
    match next {
        Some(segment) if segment.parse::<usize>().is_ok() => Value::Array(Vec::new()),
        _ => Value::Null,
    }
}

/// Pick top-level keys out of a seed object
pub fn pick<'a>(seed: &Map<String, Value>, keys: impl IntoIterator<Item = &'a str>) -> Value {
    let mut picked = Map::new();
    for key in keys {
        if let Some(value) = seed.get(key) {
            picked.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(picked)
}

/// Keep the first item for each distinct value of `key`.
///
/// Items without the key share a single "missing" bucket.
pub fn dedup_by_key(items: Vec<Value>, key: &str) -> Vec<Value> {
    let mut seen: Vec<Option<Value>> = Vec::new();

    items
        .into_iter()
        .filter(|item| {
            let id = item.get(key).cloned();
            if seen.contains(&id) {
                false
            } else {
                seen.push(id);
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_defaults_fills_missing_keys() {
        let mut target = json!({ "a": 1, "nested": { "x": "own" } });
        deep_defaults(&mut target, &json!({ "a": 2, "b": 3, "nested": { "x": "def", "y": "def" } }));
        assert_eq!(target, json!({ "a": 1, "b": 3, "nested": { "x": "own", "y": "def" } }));
    }

    #[test]
    fn test_deep_defaults_keeps_null_and_arrays() {
        let mut target = json!({ "a": null, "list": [1] });
        deep_defaults(&mut target, &json!({ "a": "def", "list": [9, 8] }));
        assert_eq!(target, json!({ "a": null, "list": [1] }));
    }

    #[test]
    fn test_deep_defaults_ignores_non_objects() {
        let mut target = json!("scalar");
        deep_defaults(&mut target, &json!({ "a": 1 }));
        assert_eq!(target, json!("scalar"));
    }

    #[test]
    fn test_get_path() {
        let root = json!({ "page": { "pageInfo": { "pageName": "home" } }, "items": [{ "n": 1 }] });
        assert_eq!(get_path(&root, "page.pageInfo.pageName"), Some(&json!("home")));
        assert_eq!(get_path(&root, "items.0.n"), Some(&json!(1)));
        assert_eq!(get_path(&root, "page.missing"), None);
        assert_eq!(get_path(&root, "page.pageInfo.pageName.deeper"), None);
    }

    #[test]
    fn test_set_path_creates_objects() {
        let mut root = json!({});
        set_path(&mut root, "a.b.c", json!(1));
        assert_eq!(root, json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn test_set_path_replaces_scalars() {
        let mut root = json!({ "a": "text" });
        set_path(&mut root, "a.b", json!(true));
        assert_eq!(root, json!({ "a": { "b": true } }));
    }

    #[test]
    fn test_set_path_array_index() {
        let mut root = json!({});
        set_path(&mut root, "list.1", json!("x"));
        assert_eq!(root, json!({ "list": [null, "x"] }));
    }

    #[test]
    fn test_set_path_refuses_overflowing_index() {
        let mut root = json!({ "list": [] });
        assert!(!set_path(&mut root, "list.18446744073709551615", json!(1)));
        assert_eq!(root, json!({ "list": [] }));
    }

    #[test]
    fn test_set_path_refuses_far_index() {
        let mut root = json!({ "list": ["a"] });
        assert!(!set_path(&mut root, "list.4000000000", json!(1)));
        assert_eq!(root, json!({ "list": ["a"] }));

        let mut root = json!({});
        assert!(!set_path(&mut root, "a.b.4000000000.c", json!(1)));
        assert_eq!(root, json!({}));
    }

    #[test]
    fn test_set_path_allows_small_gap() {
        let mut root = json!({ "list": ["a"] });
        assert!(set_path(&mut root, "list.3", json!("d")));
        assert_eq!(root, json!({ "list": ["a", null, null, "d"] }));
    }

    #[test]
    fn test_numeric_key_on_object_is_not_an_index() {
        let mut root = json!({ "codes": {} });
        assert!(set_path(&mut root, "codes.4000000000", json!("x")));
        assert_eq!(root, json!({ "codes": { "4000000000": "x" } }));
    }

    #[test]
    fn test_pick() {
        let seed = json!({ "a": 1, "b": 2, "c": 3 });
        let picked = pick(seed.as_object().unwrap(), ["a", "c", "missing"]);
        assert_eq!(picked, json!({ "a": 1, "c": 3 }));
    }

    #[test]
    fn test_dedup_keeps_first() {
        let items = vec![
            json!({ "cause": "a", "text": "new" }),
            json!({ "cause": "b", "text": "b" }),
            json!({ "cause": "a", "text": "old" }),
        ];
        let deduped = dedup_by_key(items, "cause");
        assert_eq!(deduped, vec![json!({ "cause": "a", "text": "new" }), json!({ "cause": "b", "text": "b" })]);
    }
}
