//! HTTP run trigger. A scheduler (or a human) hits `GET /cron/digest` with
//! the shared secret either as a bearer token or a `?secret=` query
//! parameter. No configured secret means open access — a documented
//! fail-open default for local setups.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    cron_secret: Option<String>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, cron_secret: Option<String>) -> Self {
        Self {
            pipeline,
            cron_secret,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/cron/digest", get(trigger_digest))
        .with_state(state)
}

#[derive(Deserialize)]
struct TriggerParams {
    secret: Option<String>,
}

fn authorized(state: &AppState, headers: &HeaderMap, params: &TriggerParams) -> bool {
    let Some(secret) = &state.cron_secret else {
        warn!("CRON_SECRET not set, skipping verification");
        return true;
    };

    let header_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {secret}"))
        .unwrap_or(false);

    header_ok || params.secret.as_deref() == Some(secret.as_str())
}

async fn trigger_digest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TriggerParams>,
) -> impl IntoResponse {
    if !authorized(&state, &headers, &params) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
    }

    info!("Digest run triggered over HTTP");
    let report = state.pipeline.run().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let body = serde_json::to_value(&report)
        .unwrap_or_else(|e| json!({ "error": format!("report serialization: {e}") }));
    (status, Json(body))
}
