//! Plain functions over the `serde_json::Value` tree held by a store.
//!
//! The tree never contains `null` or empty objects: writing `null` removes, and removing the last
//! child of an object removes the object as well.

use serde_json::{Map, Value};

use crate::path::Path;

#[must_use]
pub fn get<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, key| node.as_object()?.get(key))
        .filter(|value| !value.is_null())
}

/// Drops nulls and empty objects. Returns `None` if nothing remains.
#[must_use]
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(object) => {
            let object: Map<String, Value> = object
                .into_iter()
                .filter_map(|(key, value)| normalize(value).map(|value| (key, value)))
                .collect();
            if object.is_empty() {
                None
            } else {
                Some(Value::Object(object))
            }
        }
        other => Some(other),
    }
}

/// Replaces the value at `path`. `None` (or a value that normalizes to nothing) removes it.
pub fn write(root: &mut Value, path: &Path, value: Option<Value>) {
    match value.and_then(normalize) {
        Some(value) => insert_at(root, path.segments(), value),
        None if path.is_root() => *root = Value::Null,
        None => remove_at(root, path.segments()),
    }
}

fn insert_at(node: &mut Value, segments: &[String], value: Value) {
    match segments {
        [] => *node = value,
        [first, rest @ ..] => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(object) = node {
                let child = object.entry(first.clone()).or_insert(Value::Null);
                insert_at(child, rest, value);
            }
        }
    }
}

fn remove_at(node: &mut Value, segments: &[String]) {
    let Some(object) = node.as_object_mut() else {
        return;
    };
    match segments {
        [] => {}
        [last] => {
            object.remove(last);
        }
        [first, rest @ ..] => {
            if let Some(child) = object.get_mut(first) {
                remove_at(child, rest);
                if child.as_object().is_some_and(Map::is_empty) {
                    object.remove(first);
                }
            }
        }
    }
}
