// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Header Store - Stateless Encrypted Header-Carried Session Storage
//!
//! A client-held key-value store transported inside a single HTTP header,
//! used instead of server-side session storage. Each request decrypts the
//! inbound header into a set of time-limited blocks; each mutation
//! re-encrypts the block set onto the response header. The client echoes
//! the header back, so no state lives on the server between requests.
//!
//! ## Modules
//!
//! - `store` - Per-request block lifecycle engine (the core)
//! - `codec` - Symmetric token encrypt/decrypt (AES-256-CBC, hex)
//! - `middleware` - Axum layer and extractor
//! - `config` - Validated header-name/secret configuration
//! - `models` - Block and block collection types
//! - `util` - Deep clone and selective omission over JSON values
//!
//! ## Security Model
//!
//! Tokens are confidential but **not authenticated**: the wire format
//! carries no integrity tag and uses a deterministic IV derived from the
//! secret. See the `codec` module docs before relying on either property.

pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod store;
pub mod util;

pub use config::{StoreConfig, DEFAULT_HEADER_NAME};
pub use error::{CodecError, ConfigError};
pub use middleware::{block_store_middleware, SharedBlockStore, Store, StoreNotInstalled};
pub use models::{Block, BlockCollection};
pub use store::BlockStore;
