//! One-shot catalog refresh from the market data feed into PostgreSQL

use crypto_hot::config::Settings;
use crypto_hot::logger::init_logger;
use crypto_hot::services::{CatalogSync, MarketClient, PostgresStore};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logger(&settings.logging);

    let store = match PostgresStore::from_settings(
        &settings.database.url,
        Some(2),
        Some(1),
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let market = &settings.market;
    let client = match MarketClient::new(
        market.endpoint.clone(),
        market.vs_currency.clone(),
        market.per_page,
        market.page,
        market.api_key.clone(),
        Duration::from_secs(market.timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build market data client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Fetching data from {}...", market.endpoint);

    match CatalogSync::new(client).run(&store).await {
        Ok(report) => {
            info!(
                "Successfully updated {} of {} cryptocurrencies",
                report.upserted, report.fetched
            );
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                error!(
                    "Catalog sync incomplete: {} failed, {} skipped, {} stored",
                    report.failed, report.skipped, report.upserted
                );
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Error updating database: {}", e);
            ExitCode::FAILURE
        }
    }
}
