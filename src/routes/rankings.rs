use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use crate::core::{ranked_view, Criterion, PairError};
use crate::models::{NextPairQuery, PairResponse, RankingQuery, RankingsResponse};
use crate::routes::{error_response, AppState};

/// Configure catalog, ranking and pairing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/items", web::get().to(list_items))
        .route("/rankings", web::get().to(list_ranked))
        .route("/pairs/next", web::get().to(next_pair));
}

/// List items in display order
///
/// GET /api/v1/items
async fn list_items(state: web::Data<AppState>) -> impl Responder {
    match state.catalog_snapshot().await {
        Ok(items) if items.is_empty() => error_response(
            StatusCode::NOT_FOUND,
            "No cryptocurrencies found",
            "the catalog is empty".to_string(),
            false,
        ),
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => {
            tracing::error!("Error fetching cryptos: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch cryptocurrencies",
                e.to_string(),
                true,
            )
        }
    }
}

/// Ranked listing
///
/// GET /api/v1/rankings?sort=hot|votes|change
///
/// Recomputed from the latest snapshot on every call.
async fn list_ranked(
    state: web::Data<AppState>,
    query: web::Query<RankingQuery>,
) -> impl Responder {
    let criterion = match query.sort.as_deref() {
        None => Criterion::default(),
        Some(raw) => match raw.parse::<Criterion>() {
            Ok(criterion) => criterion,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid sort",
                    e.to_string(),
                    false,
                );
            }
        },
    };

    let items = match state.catalog_snapshot().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load catalog for rankings: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch rankings",
                e.to_string(),
                true,
            );
        }
    };

    let ranked = ranked_view(&items, criterion);

    tracing::debug!("Ranked {} items by {}", ranked.len(), criterion);

    HttpResponse::Ok().json(RankingsResponse {
        sort: criterion.to_string(),
        total_items: ranked.len(),
        items: ranked,
    })
}

/// Draw the next comparison pair
///
/// GET /api/v1/pairs/next?itemCount={n}&previous={a},{b}
///
/// Without `itemCount` the pair indexes the server's display-ordered catalog
/// and the two items are included in the response.
async fn next_pair(
    state: web::Data<AppState>,
    query: web::Query<NextPairQuery>,
) -> impl Responder {
    let previous = query.previous_pair();

    let (item_count, items) = match query.item_count {
        Some(count) => (count, None),
        None => match state.catalog_snapshot().await {
            Ok(items) => (items.len(), Some(items)),
            Err(e) => {
                tracing::error!("Failed to load catalog for pairing: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to draw pair",
                    e.to_string(),
                    true,
                );
            }
        },
    };

    let drawn = {
        let mut rng = rand::rng();
        state.selector.next_pair(&mut rng, item_count, previous)
    };

    let pair = match drawn {
        Ok(pair) => pair,
        Err(e @ PairError::InsufficientCandidates(_)) => {
            return error_response(
                StatusCode::CONFLICT,
                "Insufficient candidates",
                e.to_string(),
                false,
            );
        }
    };

    let items = items.map(|items| [items[pair.first].clone(), items[pair.second].clone()]);

    HttpResponse::Ok().json(PairResponse {
        pair: pair.as_array(),
        items,
    })
}
