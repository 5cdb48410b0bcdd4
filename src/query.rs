//! Filtering, sorting and aggregation over a materialized review list.
//!
//! Every backend hands its records to these functions, so in-memory and
//! document-store deployments answer read queries identically.

use crate::storage::Review;
use serde::Serialize;

/// Default number of reviews returned by `recent` when no usable limit is given
pub const DEFAULT_RECENT_LIMIT: i64 = 3;

/// Sort direction for rating sorts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Only the exact string `desc` selects descending order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Per-product rating summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub product_id: i64,
    pub average_rating: f64,
    pub total_reviews: usize,
}

/// Mean rating of the given product, or `None` when it has no reviews.
pub fn average(reviews: &[Review], product_id: i64) -> Option<RatingSummary> {
    let ratings: Vec<i64> = reviews
        .iter()
        .filter(|r| r.product_id == product_id)
        .map(|r| r.rating)
        .collect();

    if ratings.is_empty() {
        return None;
    }

    let mean = ratings.iter().map(|&r| r as f64).sum::<f64>() / ratings.len() as f64;

    Some(RatingSummary {
        product_id,
        average_rating: round2(mean),
        total_reviews: ratings.len(),
    })
}

/// Round to two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Case-insensitive substring match on the review text.
/// An empty keyword matches everything.
pub fn search(reviews: &[Review], keyword: &str) -> Vec<Review> {
    let needle = keyword.to_lowercase();
    reviews
        .iter()
        .filter(|r| r.review.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn filter_by_rating(reviews: &[Review], rating: i64) -> Vec<Review> {
    reviews
        .iter()
        .filter(|r| r.rating == rating)
        .cloned()
        .collect()
}

pub fn filter_by_product(reviews: &[Review], product_id: i64) -> Vec<Review> {
    reviews
        .iter()
        .filter(|r| r.product_id == product_id)
        .cloned()
        .collect()
}

/// Stable sort by rating. Ties keep their insertion order in both directions.
pub fn sort_by_rating(reviews: &[Review], order: SortOrder) -> Vec<Review> {
    let mut sorted = reviews.to_vec();
    match order {
        SortOrder::Asc => sorted.sort_by(|a, b| a.rating.cmp(&b.rating)),
        SortOrder::Desc => sorted.sort_by(|a, b| b.rating.cmp(&a.rating)),
    }
    sorted
}

/// Last `limit` reviews in insertion order.
/// Non-positive limits yield nothing; oversize limits yield everything.
pub fn recent(reviews: &[Review], limit: i64) -> Vec<Review> {
    let take = usize::try_from(limit).unwrap_or(0).min(reviews.len());
    reviews[reviews.len() - take..].to_vec()
}
