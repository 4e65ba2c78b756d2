use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ranked listing with its accumulated head-to-head counters
///
/// Metadata fields are refreshed by the catalog sync. The counters are
/// read-only outside this crate; they are changed through `record_win` and
/// `record_loss`, which the vote recorder calls inside a store transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<i32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// 24h price change in percent
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub(crate) wins: i64,
    #[serde(default)]
    pub(crate) losses: i64,
    #[serde(default)]
    pub(crate) total_votes: i64,
}

impl Item {
    /// Build a fresh item with zeroed counters from a catalog record
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            symbol: record.symbol,
            name: record.name,
            image: record.image,
            current_price: record.current_price,
            market_cap: record.market_cap,
            market_cap_rank: record.market_cap_rank,
            total_volume: record.total_volume,
            price_change_24h: record.price_change_24h,
            circulating_supply: record.circulating_supply,
            wins: 0,
            losses: 0,
            total_votes: 0,
        }
    }

    /// Item carrying the given counters, for fixtures and benchmarks
    #[doc(hidden)]
    pub fn with_counters(record: ItemRecord, wins: i64, losses: i64) -> Self {
        Self {
            wins,
            losses,
            total_votes: wins + losses,
            ..Self::from_record(record)
        }
    }

    pub fn wins(&self) -> i64 {
        self.wins
    }

    pub fn losses(&self) -> i64 {
        self.losses
    }

    pub fn total_votes(&self) -> i64 {
        self.total_votes
    }

    /// Overwrite the descriptive fields, leaving the counters untouched
    pub(crate) fn apply_record(&mut self, record: ItemRecord) {
        self.symbol = record.symbol;
        self.name = record.name;
        self.image = record.image;
        self.current_price = record.current_price;
        self.market_cap = record.market_cap;
        self.market_cap_rank = record.market_cap_rank;
        self.total_volume = record.total_volume;
        self.price_change_24h = record.price_change_24h;
        self.circulating_supply = record.circulating_supply;
    }

    pub(crate) fn record_win(&mut self) {
        self.wins += 1;
        self.total_votes += 1;
    }

    pub(crate) fn record_loss(&mut self) {
        self.losses += 1;
        self.total_votes += 1;
    }

    /// Fraction of comparisons won, 0.0 when the item has never been compared
    pub fn win_rate(&self) -> f64 {
        let compared = self.wins + self.losses;
        if compared <= 0 {
            return 0.0;
        }
        self.wins as f64 / compared as f64
    }

    /// `total_votes` must always equal `wins + losses`
    pub fn is_consistent(&self) -> bool {
        self.total_votes == self.wins + self.losses
    }
}

/// Metadata-only catalog entry written by the market data sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<i32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    /// 24h price change in percent
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
}

/// Immutable record of one comparison outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub winner_id: String,
    pub loser_id: String,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(winner_id: &str, loser_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            winner_id: winner_id.to_string(),
            loser_id: loser_id.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether this vote names the given item on either side
    pub fn involves(&self, item_id: &str) -> bool {
        self.winner_id == item_id || self.loser_id == item_id
    }
}

/// Committed result of a single vote submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub winner: Item,
    pub loser: Item,
    pub vote: Vote,
}

/// Two distinct indices into the caller's item list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub first: usize,
    pub second: usize,
}

impl Pair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// Equality ignoring which side each index is on
    pub fn same_items(&self, other: &Pair) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }

    /// Whether both indices fall inside a list of `item_count` items
    pub fn fits(&self, item_count: usize) -> bool {
        self.first < item_count && self.second < item_count
    }

    pub fn as_array(&self) -> [usize; 2] {
        [self.first, self.second]
    }
}

/// Display order for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderHint {
    /// Market-cap rank ascending, unranked items last, then insertion order
    #[default]
    MarketCapRank,
    /// Insertion order only
    Insertion,
}

impl OrderHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderHint::MarketCapRank => "market_cap_rank",
            OrderHint::Insertion => "insertion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            symbol: id.to_uppercase(),
            name: format!("Coin {}", id),
            image: None,
            current_price: Some(1.0),
            market_cap: None,
            market_cap_rank: Some(3),
            total_volume: None,
            price_change_24h: Some(-2.5),
            circulating_supply: None,
        }
    }

    #[test]
    fn test_counters_stay_consistent() {
        let mut item = Item::from_record(record("btc"));
        item.record_win();
        item.record_win();
        item.record_loss();

        assert_eq!(item.wins, 2);
        assert_eq!(item.losses, 1);
        assert_eq!(item.total_votes, 3);
        assert!(item.is_consistent());
    }

    #[test]
    fn test_apply_record_keeps_counters() {
        let mut item = Item::from_record(record("eth"));
        item.record_win();

        let mut refreshed = record("eth");
        refreshed.name = "Ether".to_string();
        refreshed.market_cap_rank = Some(2);
        item.apply_record(refreshed);

        assert_eq!(item.name, "Ether");
        assert_eq!(item.market_cap_rank, Some(2));
        assert_eq!(item.wins, 1);
        assert_eq!(item.total_votes, 1);
    }

    #[test]
    fn test_win_rate_without_votes_is_zero() {
        let item = Item::from_record(record("sol"));
        assert_eq!(item.win_rate(), 0.0);
    }

    #[test]
    fn test_fixture_counters_are_consistent() {
        let item = Item::with_counters(record("ada"), 3, 1);
        assert_eq!(item.wins(), 3);
        assert_eq!(item.losses(), 1);
        assert_eq!(item.total_votes(), 4);
        assert!(item.is_consistent());
    }

    #[test]
    fn test_record_uses_stored_field_name() {
        let json = r#"{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "price_change_24h": 1.25}"#;
        let record: ItemRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.price_change_24h, Some(1.25));
    }

    #[test]
    fn test_vote_serializes_camel_case() {
        let vote = Vote::new("bitcoin", "dogecoin");
        let value = serde_json::to_value(&vote).unwrap();

        assert_eq!(value["winnerId"], "bitcoin");
        assert_eq!(value["loserId"], "dogecoin");
        assert!(value.get("createdAt").is_some());
        assert!(vote.involves("dogecoin"));
        assert!(!vote.involves("solana"));
    }

    #[test]
    fn test_pair_same_items_ignores_sides() {
        let pair = Pair::new(2, 5);
        assert!(pair.same_items(&Pair::new(5, 2)));
        assert!(!pair.same_items(&Pair::new(2, 4)));
        assert!(pair.fits(6));
        assert!(!pair.fits(5));
    }
}
