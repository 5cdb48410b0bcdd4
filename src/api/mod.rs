pub mod models;
pub mod review;
pub mod search;

// Re-exports
pub use models::*;

use axum::{Json, extract::State};

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, AppError> {
    let total_reviews = state.store.count().await?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
        total_reviews,
    }))
}

pub async fn home_handler(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::message(format!(
        "Welcome to the Review Service API ({} backend)",
        state.store.backend()
    )))
}
