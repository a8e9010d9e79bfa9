use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use titanic_classifiers::profiling::{ResourceProfile, ResourceSnapshot};

use super::error::ApiError;
use super::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject requests whose `X-API-Key` does not match the configured key.
/// Passes everything through when no key is configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = state.api_key() {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            log::warn!("Rejected {} {}: bad API key", request.method(), request.uri().path());
            return ApiError::Unauthorized.into_response();
        }
    }
    next.run(request).await
}

async fn snapshot(state: &Arc<AppState>) -> ResourceSnapshot {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.resource_snapshot())
        .await
        .unwrap_or_else(|e| {
            log::debug!("Resource snapshot task failed: {}", e);
            ResourceSnapshot::default()
        })
}

/// Count the request and log memory, CPU and time spent handling it.
pub async fn profile_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let total = state.record_request();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let before = snapshot(&state).await;
    let start = Instant::now();

    let response = next.run(request).await;

    let profile = ResourceProfile {
        before,
        after: snapshot(&state).await,
        wall_time: start.elapsed(),
    };
    log::info!(
        "Handled {} {} ({}): {} | Total Requests: {}",
        method,
        path,
        response.status().as_u16(),
        profile,
        total
    );
    response
}
