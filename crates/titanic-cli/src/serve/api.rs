use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{handlers, middleware, state::AppState};

async fn handle_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

/// `/health` is open; `/predict` and `/feature_importance` need the API key.
/// Every request, rejected or not, goes through the profiling layer.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/feature_importance", get(handlers::feature_importance))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(handle_404)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::profile_request,
        ))
        .with_state(state)
}
