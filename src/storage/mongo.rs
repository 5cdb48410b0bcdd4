use super::{NewReview, Review, ReviewPatch, ReviewStore, StorageError};
use crate::config::MongoConfig;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};
use std::time::Duration;
use tracing::{debug, info};

const COUNTERS_COLLECTION: &str = "counters";

/// Reviews kept in a MongoDB collection.
///
/// Holds one long-lived client for the lifetime of the process. The driver's
/// client is safe to share across request tasks, so no extra locking is done
/// here; concurrent writers are the store's concern.
///
/// Ids come from a per-collection counter document that is raised to the
/// current max id before each increment, so a deleted top id is not reused.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<Review>,
    counters: Collection<Document>,
    counter_key: String,
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl MongoStore {
    /// One connection attempt: build the client, then ping the server.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StorageError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.server_selection_timeout =
            Some(Duration::from_millis(config.server_selection_timeout_ms));
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        client.database("admin").run_command(doc! { "ping": 1 }).await?;

        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(&config.database));
        info!(
            database = %database.name(),
            collection = %config.collection,
            "Using review collection"
        );

        Ok(Self {
            collection: database.collection(&config.collection),
            counters: database.collection(COUNTERS_COLLECTION),
            counter_key: config.collection.clone(),
        })
    }

    async fn max_id(&self) -> Result<i64, StorageError> {
        let last = self
            .collection
            .find_one(doc! {})
            .projection(doc! { "_id": 0 })
            .sort(doc! { "id": -1 })
            .await?;
        Ok(last.map_or(0, |r| r.id))
    }

    async fn counter_value(&self) -> Result<i64, StorageError> {
        let counter = self.counters.find_one(doc! { "_id": self.counter_key.as_str() }).await?;
        counter.map_or(Ok(0), |c| read_seq(&c))
    }

    /// Reserving form of `next_id`: raise the counter to the current max id,
    /// then take the next value in one atomic `$inc`. Returns the same id
    /// `next_id` reports when no other writer interleaves.
    async fn allocate_id(&self) -> Result<i64, StorageError> {
        let filter = doc! { "_id": self.counter_key.as_str() };
        let floor = self.max_id().await?;
        self.counters
            .update_one(filter.clone(), doc! { "$max": { "seq": floor } })
            .upsert(true)
            .await?;

        let counter = self
            .counters
            .find_one_and_update(filter, doc! { "$inc": { "seq": 1_i64 } })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| StorageError::Backend("id counter vanished".to_string()))?;
        read_seq(&counter)
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<Review>, StorageError> {
        let cursor = self
            .collection
            .find(filter)
            .projection(doc! { "_id": 0 })
            .sort(doc! { "id": 1 })
            .await?;
        Ok(cursor.try_collect::<Vec<Review>>().await?)
    }
}

fn read_seq(counter: &Document) -> Result<i64, StorageError> {
    counter
        .get_i64("seq")
        .map_err(|e| StorageError::Serialization(format!("id counter: {e}")))
}

fn patch_to_set(patch: ReviewPatch) -> Document {
    let mut set = Document::new();
    if let Some(product_id) = patch.product_id {
        set.insert("product_id", product_id);
    }
    if let Some(review) = patch.review {
        set.insert("review", review);
    }
    if let Some(rating) = patch.rating {
        set.insert("rating", rating);
    }
    set
}

#[async_trait]
impl ReviewStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn list_all(&self) -> Result<Vec<Review>, StorageError> {
        self.find_many(doc! {}).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, StorageError> {
        Ok(self
            .collection
            .find_one(doc! { "id": id })
            .projection(doc! { "_id": 0 })
            .await?)
    }

    async fn find_by_product(&self, product_id: i64) -> Result<Vec<Review>, StorageError> {
        self.find_many(doc! { "product_id": product_id }).await
    }

    async fn insert(&self, review: NewReview) -> Result<Review, StorageError> {
        let created = review.with_id(self.allocate_id().await?);
        self.collection.insert_one(&created).await?;
        debug!(id = created.id, "Inserted review document");
        Ok(created)
    }

    async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Option<Review>, StorageError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        Ok(self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": patch_to_set(patch) })
            .projection(doc! { "_id": 0 })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Peek only; `insert` goes through `allocate_id`.
    async fn next_id(&self) -> Result<i64, StorageError> {
        Ok(self.max_id().await?.max(self.counter_value().await?) + 1)
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let n = self.collection.count_documents(doc! {}).await?;
        usize::try_from(n).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
