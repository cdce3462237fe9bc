// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error types for the header store.
//!
//! `CodecError` covers every way an inbound token can fail to decode
//! (and the practically-unreachable outbound encode failure). It is always
//! propagated to the caller: a corrupt token is semantically different from
//! an absent one, and the engine never silently substitutes an empty store.
//!
//! `ConfigError` is raised when a `StoreConfig` is built, so that a missing
//! secret or an invalid header name surfaces at startup instead of on the
//! first request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Token encode/decode failure.
///
/// Note that the codec provides no integrity check: ciphertext that has been
/// tampered with is only rejected if it fails padding or the JSON parse gate.
/// A forged token that survives both is accepted as legitimate state.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The header is present but its value is not a valid UTF-8 string,
    /// so it cannot be a token this crate minted. Distinct from an absent
    /// header, which legitimately means "no prior state".
    #[error("token header value is not valid UTF-8")]
    HeaderValue,

    /// The token is not valid hex.
    #[error("token is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Decryption failed (bad padding for the derived key/IV).
    #[error("cipher error: {0}")]
    Cipher(String),

    /// The decrypted bytes are not valid JSON, or the JSON does not have
    /// the shape of a block collection.
    #[error("invalid block collection payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration failure, raised when a [`StoreConfig`](crate::config::StoreConfig)
/// is constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The encryption key is empty.
    #[error("encryption key must not be empty")]
    EmptyEncryptionKey,

    /// The header name is empty.
    #[error("header name must not be empty")]
    EmptyHeaderName,

    /// The header name is not a valid HTTP header name.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
}

#[derive(Serialize)]
struct CodecErrorBody {
    error: String,
    error_code: String,
}

impl CodecError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            CodecError::HeaderValue | CodecError::Hex(_) => "malformed_token",
            CodecError::Cipher(_) => "cipher_error",
            CodecError::Json(_) => "invalid_payload",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// Every codec failure on an inbound token is the client's fault: the
    /// header the client echoed back is not one this server produced.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for CodecError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(CodecErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
