use serde::{Deserialize, Serialize};
use crate::models::domain::{Item, VoteOutcome};

/// Response for a recorded vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub success: bool,
    pub data: VoteOutcome,
}

/// One row of a ranked listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedItem {
    /// 1-based position in the ranking
    pub rank: usize,
    /// Win rate in percent
    pub win_rate: f64,
    #[serde(flatten)]
    pub item: Item,
}

/// Response for the rankings endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsResponse {
    pub sort: String,
    pub items: Vec<RankedItem>,
    pub total_items: usize,
}

/// Response for the next-pair endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairResponse {
    pub pair: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<[Item; 2]>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cache_entries: Option<u64>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// Whether resubmitting the same request is safe
    pub retryable: bool,
}
