//! Request-scoped binding of the shared record store.
//!
//! [`StoreLayer`] wraps the router and stamps every inbound request with a
//! [`BoundStore`] in its extensions. Handlers ask for a [`Store`] argument,
//! which axum extracts from those extensions. The binding lives and dies
//! with the request, so concurrent requests never see each other's
//! bindings, and there is no process-wide handle to reach for.
//!
//! A handler reached without passing through the layer is a wiring bug.
//! Extraction then rejects with [`MissingStore`], which is logged and
//! rendered as a 500.

use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chirp_store::{RecordStore, StoreResult};
use tower::{Layer, Service};

use crate::error::{ServerError, ServerResult};
use crate::handler::Message;

/// Extension value carrying the store for one request.
#[derive(Clone)]
pub struct BoundStore(Arc<dyn RecordStore>);

/// Layer that binds a shared store to every request passing through it.
#[derive(Clone)]
pub struct StoreLayer {
    store: Arc<dyn RecordStore>,
}

impl StoreLayer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for StoreLayer {
    type Service = StoreService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StoreService {
            inner,
            store: Arc::clone(&self.store),
        }
    }
}

/// Service produced by [`StoreLayer`].
#[derive(Clone)]
pub struct StoreService<S> {
    inner: S,
    store: Arc<dyn RecordStore>,
}

impl<S, B> Service<Request<B>> for StoreService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        req.extensions_mut()
            .insert(BoundStore(Arc::clone(&self.store)));
        self.inner.call(req)
    }
}

/// Handler-side accessor for the store bound to the current request.
#[derive(Clone)]
pub struct Store(Arc<dyn RecordStore>);

impl Store {
    /// Run a store operation on the blocking pool.
    ///
    /// Store calls take a lock and may touch disk, so they stay off the
    /// async worker threads.
    pub async fn run<T, F>(&self, op: F) -> ServerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.0);
        let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| ServerError::Internal(format!("store task failed: {e}")))?;
        Ok(result?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Store
where
    S: Send + Sync,
{
    type Rejection = MissingStore;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BoundStore>()
            .map(|bound| Self(Arc::clone(&bound.0)))
            .ok_or(MissingStore)
    }
}

/// Rejection for a handler reached without a bound store.
#[derive(Debug, Clone, Copy)]
pub struct MissingStore;

impl IntoResponse for MissingStore {
    fn into_response(self) -> Response {
        tracing::error!("no record store bound to request; is StoreLayer installed?");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Message::new("internal server error")),
        )
            .into_response()
    }
}
