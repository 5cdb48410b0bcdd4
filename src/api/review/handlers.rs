use crate::api::models::*;
use crate::storage::Review;
use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

pub async fn list_reviews_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let reviews = state.store.list_all().await?;
    Ok(Json(ApiResponse::list(reviews)))
}

pub async fn get_review_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let review = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    Ok(Json(ApiResponse::data(review)))
}

/// Reviews for one product; an unknown product is an empty list, not an error
pub async fn product_reviews_handler(
    State(state): State<AppState>,
    PathId(product_id): PathId,
) -> Result<Json<ApiResponse<Vec<Review>>>, AppError> {
    let reviews = state.store.find_by_product(product_id).await?;
    Ok(Json(ApiResponse::list(reviews)))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    ReviewBody(request): ReviewBody<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), AppError> {
    let new_review = request.validate().map_err(AppError::BadRequest)?;

    info!(product_id = new_review.product_id, rating = new_review.rating, "Adding review");

    let created = state.store.insert(new_review).await?;

    info!(id = created.id, "Review added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(created).with_message("Review created successfully")),
    ))
}

pub async fn update_review_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
    ReviewBody(request): ReviewBody<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>, AppError> {
    let updated = state
        .store
        .update(id, request.into())
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    info!(id, "Review updated");

    Ok(Json(ApiResponse::data(updated).with_message("Review updated")))
}

/// Deleting an id that does not exist still reports success
pub async fn delete_review_handler(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let removed = state.store.delete(id).await?;

    info!(id, removed, "Delete review");

    Ok(Json(ApiResponse::message("Review deleted")))
}
