use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use crypto_hot::config::{Settings, StoreBackend};
use crypto_hot::core::PairSelector;
use crypto_hot::logger::init_logger;
use crypto_hot::routes::{self, AppState};
use crypto_hot::services::{CacheManager, CatalogStore, CatalogSync, MarketClient, MemoryStore, PostgresStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    init_logger(&settings.logging);

    info!("Starting Crypto Hot voting service...");

    // Initialize catalog store
    let store: Arc<dyn CatalogStore> = match settings.store.backend {
        StoreBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let postgres = PostgresStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .unwrap_or_else(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                panic!("PostgreSQL connection error: {}", e);
            });

            info!("PostgreSQL catalog store initialized (max: {} connections)", db_max_conn);
            Arc::new(postgres)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory catalog store; votes will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize cache manager (optional - app works without it)
    let cache = match (&settings.cache.redis_url, settings.cache.enabled) {
        (Some(redis_url), true) => {
            let ttl = settings.cache.ttl_secs.unwrap_or(10);
            let l1_size = settings.cache.l1_cache_size.unwrap_or(64);

            match CacheManager::new(redis_url, l1_size, ttl).await {
                Ok(c) => {
                    info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_size, ttl);
                    Some(Arc::new(c))
                }
                Err(e) => {
                    error!("Failed to connect to Redis ({}), running without cache", e);
                    None
                }
            }
        }
        _ => {
            info!("Catalog cache disabled");
            None
        }
    };

    let selector = PairSelector::new(settings.pairing.avoid_previous_pair);
    let app_state = AppState::new(store, cache, selector);

    // Periodic catalog refresh, independent of vote handling
    if let Some(interval_secs) = settings.market.sync_interval_secs {
        spawn_catalog_sync(&settings, app_state.clone(), Duration::from_secs(interval_secs.max(60)));
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

fn spawn_catalog_sync(settings: &Settings, state: AppState, every: Duration) {
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
            error!("Failed to build market data client, catalog sync disabled: {}", e);
            return;
        }
    };

    let sync = CatalogSync::new(client);
    info!("Catalog sync scheduled every {}s", every.as_secs());

    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match sync.run(state.store.as_ref()).await {
                Ok(report) => {
                    if !report.is_complete() {
                        warn!(
                            "Catalog sync incomplete: {} failed, {} skipped, {} stored",
                            report.failed, report.skipped, report.upserted
                        );
                    }
                    state.invalidate_catalog().await
                }
                Err(e) => error!("Catalog sync failed: {}", e),
            }
        }
    });
}
