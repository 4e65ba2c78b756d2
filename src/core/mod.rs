// Core engine exports
pub mod pairing;
pub mod ranking;
pub mod recorder;

pub use pairing::{PairError, PairSelector};
pub use ranking::{rank, ranked_view, Criterion, RankingError};
pub use recorder::{VoteError, VoteRecorder};
