pub mod connect;
pub mod memory;
pub mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored product review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub review: String,
    pub rating: i64,
}

/// Review fields supplied by a client on create; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: i64,
    pub review: String,
    pub rating: i64,
}

impl NewReview {
    pub fn with_id(self, id: i64) -> Review {
        Review {
            id,
            product_id: self.product_id,
            review: self.review,
            rating: self.rating,
        }
    }
}

/// Sparse update: only present fields overwrite the stored record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub product_id: Option<i64>,
    pub review: Option<String>,
    pub rating: Option<i64>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.product_id.is_none() && self.review.is_none() && self.rating.is_none()
    }

    pub fn apply(self, target: &mut Review) {
        if let Some(product_id) = self.product_id {
            target.product_id = product_id;
        }
        if let Some(review) = self.review {
            target.review = review;
        }
        if let Some(rating) = self.rating {
            target.rating = rating;
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("document conversion failed: {0}")]
    Serialization(String),
}

/// Review persistence, hiding whether records live in-process or in a document store.
///
/// Implementations return records in insertion order and assign ids through
/// `next_id` so that ids are never reused after a delete of the highest id.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn list_all(&self) -> Result<Vec<Review>, StorageError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, StorageError>;

    async fn find_by_product(&self, product_id: i64) -> Result<Vec<Review>, StorageError>;

    /// Store a new review under `next_id()` and return it
    async fn insert(&self, review: NewReview) -> Result<Review, StorageError>;

    /// Merge `patch` into the review with `id`. `None` when no such review exists.
    async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Option<Review>, StorageError>;

    /// Returns true when a review was removed
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;

    /// Max existing id + 1, or 1 for an empty collection, raised past any
    /// id already handed out. `insert` assigns exactly this value; stores
    /// that cannot hold a lock across the two steps reserve it atomically.
    async fn next_id(&self) -> Result<i64, StorageError>;

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.list_all().await?.len())
    }
}

/// Demo data the in-memory backend starts with
pub fn demo_reviews() -> Vec<Review> {
    [
        (1, 101, "Great product!", 5),
        (2, 101, "Good quality for the price", 4),
        (3, 102, "Not what I expected", 2),
        (4, 103, "Excellent! Will buy again", 5),
        (5, 101, "Fast delivery & nice packaging", 5),
        (6, 104, "Item arrived damaged", 1),
    ]
    .into_iter()
    .map(|(id, product_id, review, rating)| Review {
        id,
        product_id,
        review: review.to_string(),
        rating,
    })
    .collect()
}
