//! Review lookup service: CRUD and read queries over product reviews,
//! stored in process memory or in a MongoDB collection.

pub mod api;
pub mod config;
pub mod query;
pub mod storage;

use crate::api::{AppState, health_handler, home_handler};
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the full router the binary serves
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .merge(api::review::routes())
        .merge(api::search::routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
