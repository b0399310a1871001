//! Flattening of nested submission sections into dotted column paths.

use serde_json::Value;

use crate::value::Cell;

/// Flatten `value` into `(path, cell)` pairs rooted at `prefix`.
///
/// Objects are walked in their own key order and each key is joined to its
/// parent path with `.`. Anything that is not an object is a leaf, including
/// `null` and arrays; an array becomes a single cell holding its JSON text.
/// An empty object contributes nothing.
pub fn flatten(prefix: &str, value: &Value) -> Vec<(String, Cell)> {
  let mut out = Vec::new();
  walk(prefix.to_owned(), value, &mut out);
  out
}

fn walk(path: String, value: &Value, out: &mut Vec<(String, Cell)>) {
  match value {
    Value::Object(map) => {
      for (key, child) in map {
        walk(format!("{path}.{key}"), child, out);
      }
    }
    leaf => out.push((path, Cell::from_json(leaf))),
  }
}
