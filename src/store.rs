// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Block Storage Engine
//!
//! The per-request lifecycle engine: decode the inbound token, drop expired
//! blocks, serve reads, and re-encode the collection on every mutation.
//!
//! One [`BlockStore`] is created per request and discarded once the response
//! is sent. It owns its block collection exclusively; there is no shared
//! state between requests and no server-side persistence — the client holds
//! the store, the server only transforms it.
//!
//! Construction is strict: an absent (or empty) inbound header yields an
//! empty collection, but a present header that fails to decode is a fatal
//! [`CodecError`]. "No prior state" and "corrupt state" are different
//! situations and the caller gets to tell them apart.

use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::codec;
use crate::config::StoreConfig;
use crate::error::CodecError;
use crate::models::{Block, BlockCollection};
use crate::util::omit_by;

/// Per-request encrypted key-value store carried in an HTTP header.
#[derive(Debug)]
pub struct BlockStore {
    config: StoreConfig,
    blocks: BlockCollection,
    /// Most recently flushed token. Applied to the response once the
    /// handler finishes; intermediate flushes are overwritten, so only the
    /// final state is transmitted.
    outbound: Option<String>,
}

impl BlockStore {
    /// Factory: build an engine from the inbound request headers.
    ///
    /// Reads the configured header; absence yields an empty collection
    /// without attempting a decode.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if a present header fails to decrypt or does
    /// not parse as a block collection. A present header whose value is not
    /// valid UTF-8 is corrupt, not absent, and fails the same way.
    pub fn from_headers(headers: &HeaderMap, config: StoreConfig) -> Result<Self, CodecError> {
        let token = match headers.get(config.header_name()) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| CodecError::HeaderValue)?),
        };
        Self::from_token(token, config)
    }

    /// Build an engine directly from an optional token string.
    ///
    /// An empty string is treated the same as an absent token: historical
    /// clients send the header with an empty value to mean "no state".
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if a non-empty token fails to decode.
    pub fn from_token(token: Option<&str>, config: StoreConfig) -> Result<Self, CodecError> {
        let blocks = match token {
            None | Some("") => BlockCollection::new(),
            Some(token) => Self::decode_active_blocks(token, &config)?,
        };

        tracing::debug!(
            header = config.header_name().as_str(),
            blocks = blocks.len(),
            "block store constructed"
        );

        Ok(Self {
            config,
            blocks,
            outbound: None,
        })
    }

    /// Decrypt a token and keep only the blocks that are still active.
    ///
    /// Expiry is evaluated on the raw decoded JSON via the omission
    /// utility, then the survivors pass through the typed parse gate. A
    /// payload that is not an object, or a surviving entry that is not a
    /// block, is a [`CodecError`].
    fn decode_active_blocks(
        token: &str,
        config: &StoreConfig,
    ) -> Result<BlockCollection, CodecError> {
        let raw: Map<String, Value> = codec::decrypt(token, config.encryption_key())?;

        let now = now_ms();
        let expired = move |value: &Value| {
            value
                .get("expiresAt")
                .and_then(Value::as_i64)
                .is_some_and(|expires_at| expires_at < now)
        };
        let active = omit_by(Some(&raw), Some(&expired)).unwrap_or_default();

        active
            .into_iter()
            .map(|(key, value)| Ok((key, serde_json::from_value::<Block>(value)?)))
            .collect()
    }

    /// True iff `key` is present in the live (already expiry-filtered)
    /// collection.
    pub fn has(&self, key: &str) -> bool {
        self.blocks.contains_key(key)
    }

    /// The stored value for `key`, or `None` if absent.
    ///
    /// Expiry was evaluated once at construction; reads neither re-check
    /// nor refresh it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.blocks.get(key).map(|block| &block.value)
    }

    /// Remaining time-to-live for `key` in milliseconds, or `0` if absent.
    ///
    /// Despite the name this is `expiresAt - now`, not an age since
    /// creation. The name (and semantic) is kept from the original wire
    /// protocol's API because downstream callers depend on it.
    pub fn get_age(&self, key: &str) -> i64 {
        match self.blocks.get(key) {
            Some(block) => block.expires_at - now_ms(),
            None => 0,
        }
    }

    /// Insert or overwrite the block for `key`, expiring `ttl_ms`
    /// milliseconds from now, then flush.
    ///
    /// Overwriting discards the previous value and expiry unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if re-encoding the collection fails.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl_ms: i64,
    ) -> Result<(), CodecError> {
        let key = key.into();
        let block = Block::new(key.clone(), value, now_ms(), ttl_ms);
        self.blocks.insert(key, block);
        self.flush()
    }

    /// Delete the block for `key`, then flush. A no-op (but still a flush)
    /// if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if re-encoding the collection fails.
    pub fn remove(&mut self, key: &str) -> Result<(), CodecError> {
        self.blocks.remove(key);
        self.flush()
    }

    /// Reset the live collection to empty, then flush.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if re-encoding the collection fails.
    pub fn clear(&mut self) -> Result<(), CodecError> {
        self.blocks.clear();
        self.flush()
    }

    /// Re-encode the live collection and record it as the outbound header
    /// value, overwriting any previous flush. Invoked by every mutator;
    /// reads never flush.
    fn flush(&mut self) -> Result<(), CodecError> {
        let token = codec::encrypt(&self.blocks, self.config.encryption_key())?;
        tracing::debug!(
            header = self.config.header_name().as_str(),
            blocks = self.blocks.len(),
            "flushed block collection"
        );
        self.outbound = Some(token);
        Ok(())
    }

    /// The token from the most recent flush, if any mutation happened.
    pub fn outbound_token(&self) -> Option<&str> {
        self.outbound.as_deref()
    }

    /// Write the most recent flushed token onto `headers`, replacing any
    /// existing value for the configured header. A store that was never
    /// mutated writes nothing.
    pub fn apply_to_headers(&self, headers: &mut HeaderMap) {
        let Some(token) = self.outbound_token() else {
            return;
        };
        match HeaderValue::from_str(token) {
            Ok(value) => {
                headers.insert(self.config.header_name().clone(), value);
            }
            Err(_) => {
                // Tokens are hex, so this cannot happen for values we mint.
                tracing::error!(
                    header = self.config.header_name().as_str(),
                    "flushed token is not a valid header value"
                );
            }
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
