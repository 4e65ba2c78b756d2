use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;
use crate::core::VoteError;
use crate::models::{HealthResponse, SubmitVoteRequest, VoteResponse};
use crate::routes::{error_response, AppState};

/// Configure vote and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/votes", web::post().to(submit_vote));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cache_entries: state.cache.as_ref().map(|cache| cache.l1_entries()),
    })
}

/// Submit vote endpoint
///
/// POST /api/v1/votes
///
/// Request body:
/// ```json
/// {
///   "winnerId": "string",
///   "loserId": "string"
/// }
/// ```
async fn submit_vote(
    state: web::Data<AppState>,
    req: web::Json<SubmitVoteRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for vote: {:?}", errors);
        return error_response(
            StatusCode::BAD_REQUEST,
            "Winner and loser IDs are required",
            errors.to_string(),
            false,
        );
    }

    tracing::debug!("Processing vote: {} > {}", req.winner_id, req.loser_id);

    match state.recorder.record_vote(&req.winner_id, &req.loser_id).await {
        Ok(outcome) => {
            // Mirrors of the catalog are stale now
            state.invalidate_catalog().await;

            HttpResponse::Ok().json(VoteResponse {
                success: true,
                data: outcome,
            })
        }
        Err(e) => vote_error_response(&e),
    }
}

fn vote_error_response(err: &VoteError) -> HttpResponse {
    match err {
        VoteError::InvalidInput(msg) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid vote", msg.clone(), false)
        }
        VoteError::NotFound(msg) => error_response(
            StatusCode::NOT_FOUND,
            "One or both cryptocurrencies not found",
            msg.clone(),
            false,
        ),
        VoteError::TransactionFailure(msg) => {
            tracing::error!("Vote processing error: {}", msg);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to process vote",
                msg.clone(),
                err.is_retryable(),
            )
        }
    }
}
