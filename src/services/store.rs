use crate::models::{Item, ItemRecord, OrderHint, Vote};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur inside a catalog store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Durable, transactional storage for items and votes
///
/// Implementations must make everything written through one
/// [`CatalogTransaction`] visible atomically on commit, and discard it if the
/// transaction is dropped without committing.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a single item by id
    async fn get_item(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Consistent snapshot of every item in the requested order
    async fn list_items(&self, order: OrderHint) -> Result<Vec<Item>, StoreError>;

    /// Insert or refresh an item's metadata; counters are never touched
    async fn upsert_item(&self, record: ItemRecord) -> Result<Item, StoreError>;

    /// Open a transaction for a vote
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// A single all-or-nothing unit of work against the catalog
#[async_trait]
pub trait CatalogTransaction: Send {
    /// Lock the given items for the rest of the transaction and return the
    /// ones that exist
    ///
    /// Locks are taken in sorted id order. May be called once per transaction.
    async fn lock_items(&mut self, ids: &[&str]) -> Result<Vec<Item>, StoreError>;

    /// Stage the counters of a previously locked item
    async fn write_counters(&mut self, item: &Item) -> Result<(), StoreError>;

    async fn append_vote(&mut self, vote: &Vote) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Sorted, deduplicated copy of `ids` in lock acquisition order
pub(crate) fn lock_order(ids: &[&str]) -> Vec<String> {
    let mut ordered: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    ordered.sort();
    ordered.dedup();
    ordered
}
