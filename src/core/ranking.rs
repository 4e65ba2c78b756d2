use crate::models::{Item, RankedItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Unknown sort criterion: {0} (expected hot, votes or change)")]
    UnknownCriterion(String),
}

/// Ordering applied to a catalog snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// Win rate, highest first
    #[default]
    Hot,
    /// Total comparisons, most first
    Votes,
    /// 24h price change percentage, largest first
    Change,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Hot => "hot",
            Criterion::Votes => "votes",
            Criterion::Change => "change",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(Criterion::Hot),
            "votes" => Ok(Criterion::Votes),
            "change" => Ok(Criterion::Change),
            _ => Err(RankingError::UnknownCriterion(s.to_string())),
        }
    }
}

/// 24h change used for ordering; missing or non-finite values count as 0
#[inline]
fn change_metric(item: &Item) -> f64 {
    item.price_change_24h
        .filter(|change| change.is_finite())
        .unwrap_or(0.0)
}

/// Order a snapshot by the given criterion
///
/// The sort is stable, so items that compare equal keep the order they had
/// in `items` (the catalog display order). Nothing is mutated.
pub fn rank(items: &[Item], criterion: Criterion) -> Vec<&Item> {
    let mut ranked: Vec<&Item> = items.iter().collect();

    match criterion {
        Criterion::Hot => ranked.sort_by(|a, b| b.win_rate().total_cmp(&a.win_rate())),
        Criterion::Votes => ranked.sort_by(|a, b| b.total_votes.cmp(&a.total_votes)),
        Criterion::Change => ranked.sort_by(|a, b| change_metric(b).total_cmp(&change_metric(a))),
    }

    ranked
}

/// Ranked view with 1-based positions and win rate in percent
pub fn ranked_view(items: &[Item], criterion: Criterion) -> Vec<RankedItem> {
    rank(items, criterion)
        .into_iter()
        .enumerate()
        .map(|(index, item)| RankedItem {
            rank: index + 1,
            win_rate: item.win_rate() * 100.0,
            item: item.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemRecord;

    fn item(id: &str, wins: i64, losses: i64, change: Option<f64>) -> Item {
        Item::with_counters(
            ItemRecord {
                id: id.to_string(),
                symbol: id.to_string(),
                name: id.to_string(),
                image: None,
                current_price: None,
                market_cap: None,
                market_cap_rank: None,
                total_volume: None,
                price_change_24h: change,
                circulating_supply: None,
            },
            wins,
            losses,
        )
    }

    fn ids(ranked: &[&Item]) -> Vec<String> {
        ranked.iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn test_hot_prefers_higher_win_rate() {
        let items = vec![item("a", 3, 1, None), item("b", 1, 0, None)];
        assert_eq!(ids(&rank(&items, Criterion::Hot)), vec!["b", "a"]);
    }

    #[test]
    fn test_hot_treats_unvoted_as_zero() {
        let items = vec![
            item("fresh", 0, 0, None),
            item("loser", 0, 4, None),
            item("winner", 1, 3, None),
        ];
        assert_eq!(ids(&rank(&items, Criterion::Hot)), vec!["winner", "fresh", "loser"]);
    }

    #[test]
    fn test_votes_orders_by_total() {
        let items = vec![item("b", 4, 3, None), item("a", 5, 5, None)];
        assert_eq!(ids(&rank(&items, Criterion::Votes)), vec!["a", "b"]);
    }

    #[test]
    fn test_change_treats_missing_as_zero() {
        let items = vec![
            item("down", 0, 0, Some(-3.0)),
            item("unknown", 0, 0, None),
            item("nan", 0, 0, Some(f64::NAN)),
            item("up", 0, 0, Some(7.5)),
        ];
        assert_eq!(
            ids(&rank(&items, Criterion::Change)),
            vec!["up", "unknown", "nan", "down"]
        );
    }

    #[test]
    fn test_ties_keep_display_order() {
        let items = vec![
            item("first", 2, 2, None),
            item("second", 1, 1, None),
            item("third", 5, 5, None),
        ];
        assert_eq!(ids(&rank(&items, Criterion::Hot)), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_does_not_mutate() {
        let items = vec![item("a", 3, 1, None), item("b", 1, 0, None)];
        let before = items.clone();
        let _ = rank(&items, Criterion::Hot);
        let _ = rank(&items, Criterion::Votes);
        assert_eq!(items, before);
    }

    #[test]
    fn test_ranked_view_positions() {
        let items = vec![item("a", 3, 1, None), item("b", 1, 0, None)];
        let view = ranked_view(&items, Criterion::Hot);

        assert_eq!(view[0].rank, 1);
        assert_eq!(view[0].item.id, "b");
        assert_eq!(view[0].win_rate, 100.0);
        assert_eq!(view[1].win_rate, 75.0);
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!("HOT".parse::<Criterion>().unwrap(), Criterion::Hot);
        assert_eq!("votes".parse::<Criterion>().unwrap(), Criterion::Votes);
        assert_eq!(" change ".parse::<Criterion>().unwrap(), Criterion::Change);
        assert!("newest".parse::<Criterion>().is_err());
        assert_eq!(Criterion::default(), Criterion::Hot);
    }
}
