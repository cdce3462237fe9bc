// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deep clone of a JSON value tree.

use serde_json::{Map, Value};

/// Produce a structurally equal copy of `value` sharing no nested structure
/// with the input.
///
/// Arrays and objects are rebuilt element by element; scalars are copied by
/// value.
pub fn clone_deep(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(clone_deep).collect()),
        Value::Object(entries) => {
            let mut cloned = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                cloned.insert(key.clone(), clone_deep(inner));
            }
            Value::Object(cloned)
        }
        scalar => scalar.clone(),
    }
}
