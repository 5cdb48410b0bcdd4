use crate::api::models::AppState;
use crate::api::search::handlers::{
    average_rating_handler, filter_handler, recent_handler, search_handler, sort_handler,
};
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reviews/search", get(search_handler))
        .route("/reviews/filter", get(filter_handler))
        .route("/reviews/sort", get(sort_handler))
        .route("/reviews/recent", get(recent_handler))
        .route(
            "/reviews/product/{product_id}/average",
            get(average_rating_handler),
        )
}
