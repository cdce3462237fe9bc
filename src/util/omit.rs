// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Selective omission over a JSON mapping.
//!
//! `omit_by` removes every entry whose value satisfies the predicate and
//! recurses into every object-typed value, whether or not the predicate
//! matched it. The recursion walks the freshly built output only; it never
//! reads from a map it is concurrently mutating, so the result cannot
//! depend on iteration order.

use serde_json::{Map, Value};

use super::clone_deep;

/// Filter `collection`, dropping entries whose values satisfy `predicate`.
///
/// - Absent collection → `None`.
/// - Absent predicate → an unchanged (deep) copy of the collection.
/// - Otherwise a deep, independent copy with matching entries removed.
///   Nested object values are filtered recursively even when the top-level
///   predicate did not remove them.
///
/// The input collection is never mutated.
pub fn omit_by(
    collection: Option<&Map<String, Value>>,
    predicate: Option<&dyn Fn(&Value) -> bool>,
) -> Option<Map<String, Value>> {
    let collection = collection?;
    let Some(predicate) = predicate else {
        return Some(
            collection
                .iter()
                .map(|(key, value)| (key.clone(), clone_deep(value)))
                .collect(),
        );
    };

    let mut result = Map::with_capacity(collection.len());
    for (key, value) in collection {
        let value = clone_deep(value);
        if predicate(&value) {
            continue;
        }
        match value {
            Value::Object(inner) => {
                let filtered = omit_by(Some(&inner), Some(predicate)).unwrap_or_default();
                result.insert(key.clone(), Value::Object(filtered));
            }
            other => {
                result.insert(key.clone(), other);
            }
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn absent_collection_yields_none() {
        let predicate = |_: &Value| true;
        assert!(omit_by(None, Some(&predicate)).is_none());
    }

    #[test]
    fn absent_predicate_yields_unchanged_copy() {
        let input = as_map(json!({"a": 1, "b": {"c": 2}}));
        let output = omit_by(Some(&input), None).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn matching_entries_are_removed() {
        let input = as_map(json!({"a": 1, "b": 2, "c": 3}));
        let predicate = |value: &Value| value.as_i64().is_some_and(|n| n > 1);
        let output = omit_by(Some(&input), Some(&predicate)).unwrap();
        assert_eq!(Value::Object(output), json!({"a": 1}));
    }

    #[test]
    fn recursion_descends_into_all_nested_objects() {
        // Nested non-block objects must be traversed without error, and the
        // predicate applied at every level.
        let input = as_map(json!({
            "a": {"b": {"drop": true}, "keep": 1},
            "c": {"keep": 2},
        }));
        let predicate =
            |value: &Value| value.get("drop").and_then(Value::as_bool).unwrap_or(false);
        let output = omit_by(Some(&input), Some(&predicate)).unwrap();
        assert_eq!(
            Value::Object(output),
            json!({"a": {"keep": 1}, "c": {"keep": 2}})
        );
    }

    #[test]
    fn input_is_never_mutated() {
        let input = as_map(json!({"a": {"b": 1}, "z": 9}));
        let before = input.clone();
        let predicate = |_: &Value| true;
        let output = omit_by(Some(&input), Some(&predicate)).unwrap();
        assert!(output.is_empty());
        assert_eq!(input, before);
    }

    #[test]
    fn expiry_shaped_predicate_over_mixed_depth() {
        // Mirrors the engine's usage: top-level blocks plus a nested
        // object that is not a block.
        let input = as_map(json!({
            "stale": {"expiresAt": 10},
            "fresh": {"expiresAt": 99_999},
            "odd": {"nested": {"expiresAt": 10}},
        }));
        let now = 1_000;
        let predicate = |value: &Value| {
            value
                .get("expiresAt")
                .and_then(Value::as_i64)
                .is_some_and(|expires_at| expires_at < now)
        };
        let output = omit_by(Some(&input), Some(&predicate)).unwrap();
        // "stale" is dropped at the top level; the nested expired entry is
        // dropped one level down, leaving "odd" empty but present.
        assert_eq!(
            Value::Object(output),
            json!({"fresh": {"expiresAt": 99_999}, "odd": {}})
        );
    }
}
