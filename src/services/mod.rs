// Service exports
pub mod cache;
pub mod market;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager, CatalogLookup};
pub use market::{CatalogSync, MarketClient, MarketError, SyncReport};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{CatalogStore, CatalogTransaction, StoreError};
