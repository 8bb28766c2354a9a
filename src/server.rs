//! HTTP server for pull-request webhooks

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::reconcile::{Outcome, Reconciler};
use crate::types::{PullRequestEvent, WebhookBody};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The reconciler, shared across deliveries
    pub reconciler: Arc<Reconciler>,
}

/// Build the HTTP router
///
/// The webhook endpoint answers both GET and POST: providers send
/// verification pings as GETs, real deliveries as POSTs.
pub fn build_router(endpoint: &str, state: AppState) -> Router {
    Router::new()
        .route(endpoint, get(webhook_handler).post(webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Handle one webhook delivery
///
/// Parses the payload into a [`PullRequestEvent`], runs the reconciler, and
/// maps its outcome onto a status code: 200 for anything handled (including
/// deliberate no-ops), 400 for unrecognizable events, 500 when a provider
/// call failed.
pub async fn webhook_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    // Verification pings arrive as GETs (or empty POSTs); acknowledge them
    // without touching any provider.
    if body.is_empty() {
        debug!("verification ping acknowledged");
        return (StatusCode::OK, Json(json!({ "status": "ok", "reason": "ping" })));
    }

    let parsed: WebhookBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "unrecognizable webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "rejected", "error": e.to_string() })),
            );
        }
    };

    let event: Option<PullRequestEvent> = parsed.pullrequest.map(Into::into);
    let outcome = state.reconciler.process(event.as_ref()).await;

    match outcome {
        Outcome::Deployed { app_name, created } => (
            StatusCode::OK,
            Json(json!({ "status": "deployed", "app": app_name, "created": created })),
        ),
        Outcome::Ignored { reason } => (
            StatusCode::OK,
            Json(json!({ "status": "ignored", "reason": reason })),
        ),
        Outcome::Deleted { app_name, found } => (
            StatusCode::OK,
            Json(json!({ "status": "deleted", "app": app_name, "found": found })),
        ),
        Outcome::Rejected => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "rejected" })),
        ),
        Outcome::Failed { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "error": message })),
        ),
    }
}
