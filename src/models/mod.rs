// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Item, ItemRecord, OrderHint, Pair, Vote, VoteOutcome};
pub use requests::{NextPairQuery, RankingQuery, SubmitVoteRequest};
pub use responses::{ErrorResponse, HealthResponse, PairResponse, RankedItem, RankingsResponse, VoteResponse};
