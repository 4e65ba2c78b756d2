use crate::models::ItemRecord;
use crate::services::store::CatalogStore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the market data feed
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Rate limited by market data provider")]
    RateLimited,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// One entry of the CoinGecko `/coins/markets` response
///
/// The feed also carries `price_change_24h` as an absolute quote-currency
/// move; only the percentage is stored.
#[derive(Debug, Clone, Deserialize)]
struct MarketEntry {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    market_cap_rank: Option<i32>,
    #[serde(default)]
    total_volume: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    circulating_supply: Option<f64>,
}

impl From<MarketEntry> for ItemRecord {
    fn from(entry: MarketEntry) -> Self {
        Self {
            id: entry.id,
            symbol: entry.symbol,
            name: entry.name,
            image: entry.image,
            current_price: entry.current_price,
            market_cap: entry.market_cap,
            market_cap_rank: entry.market_cap_rank,
            total_volume: entry.total_volume,
            price_change_24h: entry.price_change_percentage_24h,
            circulating_supply: entry.circulating_supply,
        }
    }
}

/// Client for the CoinGecko `/coins/markets` endpoint
pub struct MarketClient {
    base_url: String,
    vs_currency: String,
    per_page: u32,
    page: u32,
    api_key: Option<String>,
    client: Client,
}

impl MarketClient {
    pub fn new(
        base_url: String,
        vs_currency: String,
        per_page: u32,
        page: u32,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, MarketError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            vs_currency,
            per_page,
            page,
            api_key,
            client,
        })
    }

    fn markets_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page={}&sparkline=false",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.vs_currency),
            self.per_page,
            self.page
        )
    }

    /// Fetch one page of listings ordered by market cap
    ///
    /// Entries missing an id, symbol or name are skipped and counted in the
    /// returned tally.
    pub async fn fetch_markets(&self) -> Result<(Vec<ItemRecord>, usize), MarketError> {
        let url = self.markets_url();
        tracing::debug!("Fetching market data from: {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Market data request failed: {} - {}", status, body);
            return Err(MarketError::ApiError(format!("Failed to fetch markets: {}", status)));
        }

        let json: Value = response.json().await?;
        let entries = json
            .as_array()
            .ok_or_else(|| MarketError::InvalidResponse("Expected a JSON array".into()))?;

        let mut skipped = 0;
        let records: Vec<ItemRecord> = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value::<MarketEntry>(entry.clone()) {
                Ok(entry) => Some(ItemRecord::from(entry)),
                Err(e) => {
                    tracing::warn!("Skipping malformed market entry: {}", e);
                    skipped += 1;
                    None
                }
            })
            .collect();

        tracing::info!("Fetched {} listings ({} skipped)", records.len(), skipped);

        Ok((records, skipped))
    }
}

/// Outcome of one catalog refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub upserted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SyncReport {
    /// Whether every parsed record was stored and at least one was
    ///
    /// Malformed feed entries do not count against the run.
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.upserted > 0
    }
}

/// Refreshes catalog metadata from the market feed
///
/// Runs outside any vote transaction: each record is a separate upsert, and a
/// record that fails is logged and counted without aborting the run.
pub struct CatalogSync {
    client: MarketClient,
}

impl CatalogSync {
    pub fn new(client: MarketClient) -> Self {
        Self { client }
    }

    pub async fn run(&self, store: &dyn CatalogStore) -> Result<SyncReport, MarketError> {
        let (records, skipped) = self.client.fetch_markets().await?;

        let mut report = SyncReport {
            fetched: records.len(),
            skipped,
            ..SyncReport::default()
        };

        for record in records {
            let name = record.name.clone();
            match store.upsert_item(record).await {
                Ok(_) => {
                    report.upserted += 1;
                    tracing::debug!("Updated {} ({}/{})", name, report.upserted, report.fetched);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Failed to update {}: {}", name, e);
                }
            }
        }

        tracing::info!(
            "Catalog sync finished: {} upserted, {} failed, {} skipped",
            report.upserted,
            report.failed,
            report.skipped
        );

        Ok(report)
    }
}
