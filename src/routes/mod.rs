// Route exports
pub mod rankings;
pub mod votes;

use actix_web::{error, web, HttpRequest, HttpResponse};
use crate::core::{PairSelector, VoteRecorder};
use crate::models::{ErrorResponse, Item, OrderHint};
use crate::services::{CacheManager, CatalogLookup, CatalogStore, StoreError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub cache: Option<Arc<CacheManager>>,
    pub recorder: VoteRecorder,
    pub selector: PairSelector,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Option<Arc<CacheManager>>,
        selector: PairSelector,
    ) -> Self {
        Self {
            recorder: VoteRecorder::new(store.clone()),
            store,
            cache,
            selector,
        }
    }

    /// Display-ordered catalog, served from cache when possible
    ///
    /// Cache failures degrade to a direct store read.
    pub async fn catalog_snapshot(&self) -> Result<Vec<Item>, StoreError> {
        let order = OrderHint::MarketCapRank;
        let mut generation = None;

        if let Some(cache) = &self.cache {
            match cache.get_catalog(order).await {
                Ok(CatalogLookup::Hit(items)) => return Ok(items),
                Ok(CatalogLookup::Miss { generation: current }) => generation = Some(current),
                Err(e) => tracing::warn!("Catalog cache read failed: {}", e),
            }
        }

        let items = self.store.list_items(order).await?;

        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            if let Err(e) = cache.set_catalog(order, generation, &items).await {
                tracing::warn!("Failed to cache catalog snapshot: {}", e);
            }
        }

        Ok(items)
    }

    /// Drop cached snapshots after the catalog changed
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_catalog().await {
                tracing::warn!("Failed to invalidate catalog cache: {}", e);
            }
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(votes::configure)
            .configure(rankings::configure),
    );
}

pub(crate) fn error_response(
    status: actix_web::http::StatusCode,
    error: &str,
    message: String,
    retryable: bool,
) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
        retryable,
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "invalid_json",
        format!("Invalid JSON: {}", err),
        false,
    );
    error::InternalError::from_response(err, response).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    let response = error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "invalid_query",
        format!("Invalid query: {}", err),
        false,
    );
    error::InternalError::from_response(err, response).into()
}
