//! Crypto Hot - head-to-head voting and ranking service for cryptocurrency listings
//!
//! Users pick the better of two listings; each pick is recorded atomically as
//! a vote and the accumulated wins and losses drive the rankings.

pub mod config;
pub mod core;
pub mod logger;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{rank, Criterion, PairError, PairSelector, VoteError, VoteRecorder};
pub use crate::models::{Item, ItemRecord, OrderHint, Pair, Vote, VoteOutcome};
pub use crate::services::{CatalogStore, MemoryStore, PostgresStore, StoreError};
