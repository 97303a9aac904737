use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use chirp_store::RecordStore;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::binder::StoreLayer;
use crate::handler;

/// Build the axum router with all Chirp endpoints bound to `store`.
///
/// Every request gets an INFO-level span and a response event carrying the
/// status, so the access log shows at the default log level.
pub fn build_router(store: Arc<dyn RecordStore>) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));
    routes().layer(StoreLayer::new(store)).layer(trace)
}

/// The bare routes, without a bound store.
pub(crate) fn routes() -> Router {
    Router::new()
        .route("/", get(handler::root_handler))
        .route("/v1/health", get(handler::health_handler))
        .route("/user/new", post(handler::create_user_handler))
        .route(
            "/user",
            get(handler::get_user_handler).delete(handler::delete_user_handler),
        )
        .route("/post", post(handler::create_post_handler))
        .route("/posts", get(handler::list_posts_handler))
}
