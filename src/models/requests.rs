use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to record one head-to-head outcome
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitVoteRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "winner_id", rename = "winnerId", default)]
    pub winner_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "loser_id", rename = "loserId", default)]
    pub loser_id: String,
}

/// Query string for the rankings endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingQuery {
    /// One of `hot`, `votes`, `change`; defaults to `hot`
    pub sort: Option<String>,
}

/// Query string for the next-pair endpoint
///
/// `previous` is the pair currently on screen as `"a,b"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextPairQuery {
    #[serde(alias = "item_count", rename = "itemCount")]
    pub item_count: Option<usize>,
    pub previous: Option<String>,
}

impl NextPairQuery {
    /// Parse `previous`; malformed values are treated as absent
    pub fn previous_pair(&self) -> Option<crate::models::Pair> {
        let raw = self.previous.as_deref()?;
        let (first, second) = raw.split_once(',')?;
        let first = first.trim().parse().ok()?;
        let second = second.trim().parse().ok()?;
        Some(crate::models::Pair::new(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pair;

    #[test]
    fn test_vote_request_accepts_both_casings() {
        let camel: SubmitVoteRequest =
            serde_json::from_str(r#"{"winnerId":"bitcoin","loserId":"ethereum"}"#).unwrap();
        let snake: SubmitVoteRequest =
            serde_json::from_str(r#"{"winner_id":"bitcoin","loser_id":"ethereum"}"#).unwrap();

        assert_eq!(camel.winner_id, snake.winner_id);
        assert_eq!(camel.loser_id, snake.loser_id);
    }

    #[test]
    fn test_vote_request_rejects_empty_ids() {
        let req: SubmitVoteRequest = serde_json::from_str(r#"{"winnerId":""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_previous_pair_parsing() {
        let query = NextPairQuery {
            item_count: None,
            previous: Some("3, 7".to_string()),
        };
        assert_eq!(query.previous_pair(), Some(Pair::new(3, 7)));

        let garbage = NextPairQuery {
            item_count: None,
            previous: Some("3".to_string()),
        };
        assert_eq!(garbage.previous_pair(), None);
    }
}
