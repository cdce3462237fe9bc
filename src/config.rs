// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Store Configuration
//!
//! Explicit, dependency-injected configuration for the header store. The
//! secret and header name are supplied by the caller (typically loaded from
//! the environment at startup) and threaded into each per-request
//! [`BlockStore`](crate::store::BlockStore) — there is no process-global
//! secret state.
//!
//! Validation happens here, at construction time, so that an empty secret
//! or a malformed header name fails at startup rather than on the first
//! request that carries a token.

use axum::http::HeaderName;

use crate::error::ConfigError;

/// Header name used when none is configured explicitly.
pub const DEFAULT_HEADER_NAME: &str = "X-Data";

/// Configuration for the header store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    header_name: HeaderName,
    encryption_key: String,
}

impl StoreConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the encryption key is empty, or if the
    /// header name is empty or not a valid HTTP header name.
    pub fn new(
        header_name: impl AsRef<str>,
        encryption_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let header_name = header_name.as_ref();
        if header_name.is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }

        let header_name = HeaderName::try_from(header_name)
            .map_err(|_| ConfigError::InvalidHeaderName(header_name.to_string()))?;

        let encryption_key = encryption_key.into();
        if encryption_key.is_empty() {
            return Err(ConfigError::EmptyEncryptionKey);
        }

        Ok(Self {
            header_name,
            encryption_key,
        })
    }

    /// Build a configuration using the default `X-Data` header name.
    pub fn with_default_header(encryption_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(DEFAULT_HEADER_NAME, encryption_key)
    }

    /// The configured header name (same name inbound and outbound).
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// The secret used to derive the cipher key and IV.
    pub fn encryption_key(&self) -> &str {
        &self.encryption_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_builds() {
        let config = StoreConfig::new("X-Data", "s3cret").unwrap();
        assert_eq!(config.header_name().as_str(), "x-data");
        assert_eq!(config.encryption_key(), "s3cret");
    }

    #[test]
    fn default_header_name_is_x_data() {
        let config = StoreConfig::with_default_header("s3cret").unwrap();
        assert_eq!(config.header_name().as_str(), "x-data");
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = StoreConfig::new("X-Data", "").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEncryptionKey));
    }

    #[test]
    fn empty_header_name_is_rejected() {
        let err = StoreConfig::new("", "s3cret").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyHeaderName));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let err = StoreConfig::new("X Data\n", "s3cret").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeaderName(_)));
    }
}
