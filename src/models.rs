// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Data model for the header store.
//!
//! A [`Block`] is one stored entry; a [`BlockCollection`] is the full set of
//! blocks carried by one token. Wire field names are camelCase
//! (`key`/`value`/`expiresAt`) to match the historical token format, so a
//! token minted by this crate decrypts to the same JSON the original
//! deployment produced.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One key/value/expiry entry in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Identifier, unique within the collection. Duplicated inside the
    /// block (in addition to being the collection key) on the wire.
    pub key: String,
    /// Arbitrary JSON payload supplied by the caller.
    pub value: Value,
    /// Absolute expiry timestamp, milliseconds since the Unix epoch.
    /// The block is active iff `expires_at >= now` at load time.
    pub expires_at: i64,
}

impl Block {
    /// Build a block expiring `ttl_ms` milliseconds after `now_ms`.
    pub fn new(key: impl Into<String>, value: Value, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at: now_ms + ttl_ms,
        }
    }
}

/// The full set of blocks carried by one token, keyed by block key.
///
/// Owned exclusively by one [`BlockStore`](crate::store::BlockStore) for the
/// lifetime of a single request/response cycle. Insertion order is
/// irrelevant.
pub type BlockCollection = HashMap<String, Block>;
