use super::{NewReview, Review, ReviewPatch, ReviewStore, StorageError};
use crate::query;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local review list guarded by a single lock.
///
/// Every read-modify-write (id assignment + append, find + merge, filter +
/// remove) happens under one write guard.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    reviews: Vec<Review>,
    /// Highest id ever assigned, so a deleted top id is not handed out again
    high_water: i64,
}

impl Inner {
    fn next_id(&self) -> i64 {
        let max = self.reviews.iter().map(|r| r.id).max().unwrap_or(0);
        max.max(self.high_water) + 1
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        let high_water = reviews.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner {
                reviews,
                high_water,
            }),
        }
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self) -> Result<Vec<Review>, StorageError> {
        Ok(self.inner.read().await.reviews.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_product(&self, product_id: i64) -> Result<Vec<Review>, StorageError> {
        let inner = self.inner.read().await;
        Ok(query::filter_by_product(&inner.reviews, product_id))
    }

    async fn insert(&self, review: NewReview) -> Result<Review, StorageError> {
        let mut inner = self.inner.write().await;
        let created = review.with_id(inner.next_id());
        inner.high_water = created.id;
        inner.reviews.push(created.clone());
        debug!(id = created.id, total = inner.reviews.len(), "Appended review");
        Ok(created)
    }

    async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Option<Review>, StorageError> {
        let mut inner = self.inner.write().await;
        Ok(inner.reviews.iter_mut().find(|r| r.id == id).map(|existing| {
            patch.apply(existing);
            existing.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let mut inner = self.inner.write().await;
        let before = inner.reviews.len();
        inner.reviews.retain(|r| r.id != id);
        Ok(inner.reviews.len() != before)
    }

    async fn next_id(&self) -> Result<i64, StorageError> {
        Ok(self.inner.read().await.next_id())
    }

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.inner.read().await.reviews.len())
    }
}
