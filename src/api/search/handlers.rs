use crate::api::models::*;
use crate::query::{self, DEFAULT_RECENT_LIMIT, RatingSummary, SortOrder};
use crate::storage::Review;
use axum::{Json, extract::State};
use tracing::info;

/// A missing `q` matches every review
pub async fn search_handler(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let keyword = params.get("q").unwrap_or_default();
    let reviews = state.store.list_all().await?;
    let results = query::search(&reviews, keyword);

    info!(q = %keyword, found = results.len(), "Searching");

    Ok(Json(ApiResponse::list(results)))
}

pub async fn filter_handler(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let rating = params
        .get_i64("rating")
        .ok_or_else(|| AppError::BadRequest("Please provide ?rating=VALUE".to_string()))?;

    let reviews = state.store.list_all().await?;
    Ok(Json(ApiResponse::list(query::filter_by_rating(&reviews, rating))))
}

pub async fn sort_handler(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let order = SortOrder::parse(params.get("order"));
    let reviews = state.store.list_all().await?;
    Ok(Json(ApiResponse::list(query::sort_by_rating(&reviews, order))))
}

/// A missing or non-integer limit falls back to the default
pub async fn recent_handler(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let limit = params.get_i64("limit").unwrap_or(DEFAULT_RECENT_LIMIT);
    let reviews = state.store.list_all().await?;
    Ok(Json(ApiResponse::list(query::recent(&reviews, limit))))
}

pub async fn average_rating_handler(
    State(state): State<AppState>,
    PathId(product_id): PathId,
) -> Result<Json<ApiResponse<RatingSummary>>, AppError> {
    let reviews = state.store.find_by_product(product_id).await?;
    let summary = query::average(&reviews, product_id)
        .ok_or_else(|| AppError::NotFound("Product has no reviews".to_string()))?;

    Ok(Json(ApiResponse::data(summary)))
}
