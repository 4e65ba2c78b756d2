use crate::models::{Item, Vote, VoteOutcome};
use crate::services::{CatalogStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while recording a vote
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
}

impl VoteError {
    /// Whether resubmitting the same vote is safe
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoteError::TransactionFailure(_))
    }
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => VoteError::NotFound(id),
            StoreError::InvalidInput(msg) => VoteError::InvalidInput(msg),
            other => VoteError::TransactionFailure(other.to_string()),
        }
    }
}

/// Single entry point for changing item counters
///
/// Each call is one user action and is applied as one store transaction:
/// both counter updates and the vote record land together or not at all.
/// Calls are not deduplicated, so a retried submission counts twice.
#[derive(Clone)]
pub struct VoteRecorder {
    store: Arc<dyn CatalogStore>,
}

impl VoteRecorder {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Record that `winner_id` beat `loser_id`
    ///
    /// Dropping the returned future before it resolves rolls the transaction
    /// back; once it resolves `Ok` the vote is committed.
    pub async fn record_vote(
        &self,
        winner_id: &str,
        loser_id: &str,
    ) -> Result<VoteOutcome, VoteError> {
        let winner_id = winner_id.trim();
        let loser_id = loser_id.trim();

        if winner_id.is_empty() || loser_id.is_empty() {
            return Err(VoteError::InvalidInput(
                "winner and loser ids are required".to_string(),
            ));
        }
        if winner_id == loser_id {
            return Err(VoteError::InvalidInput(format!(
                "an item cannot be voted against itself: {}",
                winner_id
            )));
        }

        let mut tx = self.store.begin().await?;

        // Existence is checked on the locked rows, so neither item can change
        // between this check and the commit.
        let locked = tx.lock_items(&[winner_id, loser_id]).await?;
        let mut winner = take_item(&locked, winner_id)?;
        let mut loser = take_item(&locked, loser_id)?;

        winner.record_win();
        loser.record_loss();

        tx.write_counters(&winner).await?;
        tx.write_counters(&loser).await?;

        let vote = Vote::new(winner_id, loser_id);
        tx.append_vote(&vote).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit vote {} > {}: {}", winner_id, loser_id, e);
            VoteError::from(e)
        })?;

        tracing::info!(
            vote_id = %vote.id,
            "Vote recorded: {} ({}-{}) beat {} ({}-{})",
            winner.id,
            winner.wins,
            winner.losses,
            loser.id,
            loser.wins,
            loser.losses
        );

        Ok(VoteOutcome { winner, loser, vote })
    }
}

fn take_item(locked: &[Item], id: &str) -> Result<Item, VoteError> {
    locked
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .ok_or_else(|| {
            tracing::debug!("Vote references unknown item: {}", id);
            VoteError::NotFound(format!("item {} does not exist", id))
        })
}
