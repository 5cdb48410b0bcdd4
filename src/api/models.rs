use crate::storage::{NewReview, ReviewPatch, ReviewStore, StorageError};
use axum::{
    Form, Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{StatusCode, header::CONTENT_TYPE, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }
}

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            total: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<U> ApiResponse<Vec<U>> {
    pub fn list(items: Vec<U>) -> Self {
        let total = items.len();
        Self {
            total: Some(total),
            ..Self::data(items)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            total: None,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }
}

/// Request body for creating a review.
///
/// Fields are optional so that missing ones can be reported together.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: Option<i64>,
    pub review: Option<String>,
    pub rating: Option<i64>,
}

impl CreateReviewRequest {
    /// Validate the request. Rating is deliberately not range-checked.
    pub fn validate(self) -> Result<NewReview, String> {
        let mut missing = Vec::new();
        if self.product_id.is_none() {
            missing.push("product_id");
        }
        if self.review.is_none() {
            missing.push("review");
        }
        if self.rating.is_none() {
            missing.push("rating");
        }

        match (self.product_id, self.review, self.rating) {
            (Some(product_id), Some(review), Some(rating)) => Ok(NewReview {
                product_id,
                review,
                rating,
            }),
            _ => Err(format!("Missing fields: {}", missing.join(", "))),
        }
    }
}

/// Partial update body; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub product_id: Option<i64>,
    pub review: Option<String>,
    pub rating: Option<i64>,
}

impl From<UpdateReviewRequest> for ReviewPatch {
    fn from(req: UpdateReviewRequest) -> Self {
        ReviewPatch {
            product_id: req.product_id,
            review: req.review,
            rating: req.rating,
        }
    }
}

/// Query-string parameters looked up by name.
///
/// A repeated key yields its first value and nothing is rejected for shape,
/// so each handler decides which parameters are required.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value of `key` parsed as an integer; absent or unparsable is `None`.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|raw| raw.trim().parse().ok())
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(QueryParams(pairs))
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub total_reviews: usize,
}

/// Body extractor accepting JSON or urlencoded forms, with rejections
/// rendered in the response envelope.
pub struct ReviewBody<T>(pub T);

impl<S, T> FromRequest<S> for ReviewBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(body) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(ReviewBody(body))
        } else {
            let Json(body) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(ReviewBody(body))
        }
    }
}

/// Integer path id. A non-integer segment names no record, so it is a 404.
pub struct PathId(pub i64);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::NotFound(e.body_text()))?;
        Ok(PathId(id))
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}
