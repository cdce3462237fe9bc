// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum wiring for the block store.
//!
//! The middleware builds a [`BlockStore`] from the inbound headers before
//! the handler runs, exposes it as a request extension, and writes the final
//! flushed token onto the response afterwards. Handlers reach the store
//! through the [`Store`] extractor:
//!
//! ```rust,ignore
//! async fn my_handler(Store(store): Store) -> Result<Json<Value>, CodecError> {
//!     store.with(|s| s.put("visits", json!(1), 60_000))?;
//!     // ...
//! }
//! ```
//!
//! Install with state:
//!
//! ```rust,ignore
//! let config = StoreConfig::with_default_header(secret)?;
//! let app = Router::new()
//!     .route("/", get(my_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         config,
//!         block_store_middleware,
//!     ));
//! ```
//!
//! A request whose token fails to decode is rejected with 400 before the
//! handler runs; "corrupt state" is never silently downgraded to "no
//! state". Callers who want the lenient behavior can build the store
//! themselves and catch the error.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::StoreConfig;
use crate::store::BlockStore;

/// Cloneable handle to the request-scoped block store.
///
/// The mutex exists only to satisfy axum's `Clone + Send + Sync` extension
/// requirements; the store is never shared across requests, so contention
/// is between at most the handler and the middleware tail, sequentially.
#[derive(Clone)]
pub struct SharedBlockStore(Arc<Mutex<BlockStore>>);

impl SharedBlockStore {
    /// Wrap a freshly constructed store.
    pub fn new(store: BlockStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut BlockStore) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Middleware that scopes a [`BlockStore`] to each request.
///
/// Decode failure on the inbound token short-circuits with the
/// [`CodecError`](crate::error::CodecError) response (HTTP 400). On success
/// the handler sees a [`SharedBlockStore`] extension, and whatever the store
/// last flushed is written to the response headers.
pub async fn block_store_middleware(
    State(config): State<StoreConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let store = match BlockStore::from_headers(request.headers(), config) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting request with undecodable store token");
            return err.into_response();
        }
    };

    let shared = SharedBlockStore::new(store);
    request.extensions_mut().insert(shared.clone());

    let mut response = next.run(request).await;
    shared.with(|store| store.apply_to_headers(response.headers_mut()));
    response
}

/// Rejection returned by [`Store`] when [`block_store_middleware`] is not
/// installed on the route.
#[derive(Debug)]
pub struct StoreNotInstalled;

impl IntoResponse for StoreNotInstalled {
    fn into_response(self) -> Response {
        let body = axum::Json(serde_json::json!({
            "error": "block store middleware not installed",
            "error_code": "store_not_installed",
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Extractor for the request-scoped block store.
///
/// Requires [`block_store_middleware`] to be installed on the route;
/// otherwise extraction fails with 500.
pub struct Store(pub SharedBlockStore);

impl<S> FromRequestParts<S> for Store
where
    S: Send + Sync,
{
    type Rejection = StoreNotInstalled;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SharedBlockStore>()
            .cloned()
            .map(Store)
            .ok_or(StoreNotInstalled)
    }
}
