use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use titanic_classifiers::data_handling::{features_to_matrix, PassengerFeatures};
use titanic_classifiers::ModelType;

use super::error::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub model: Option<String>,
}

impl ModelQuery {
    /// Requested family, `rf` when absent.
    fn model_type(&self) -> ApiResult<ModelType> {
        match self.model.as_deref() {
            None => Ok(ModelType::RandomForest),
            Some(tag) => tag
                .parse()
                .map_err(|e: titanic_classifiers::ModelError| ApiError::BadRequest(e.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predictions: Vec<u8>,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
    payload: Result<Json<Vec<PassengerFeatures>>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let model_type = query.model_type()?;
    let Json(passengers) = payload.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(e) => ApiError::Unprocessable(e.body_text()),
        other => ApiError::BadRequest(other.body_text()),
    })?;

    for (i, passenger) in passengers.iter().enumerate() {
        passenger
            .validate()
            .map_err(|e| ApiError::Unprocessable(format!("record {}: {}", i, e)))?;
    }
    if passengers.is_empty() {
        return Ok(Json(PredictResponse {
            predictions: Vec::new(),
        }));
    }

    let x = features_to_matrix(&passengers);
    let predictions = tokio::task::spawn_blocking(move || state.model(model_type).predict(&x))
        .await
        .map_err(|e| ApiError::Internal(format!("Prediction failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("Prediction failed: {}", e)))?;

    log::debug!(
        "Predicted {} passengers with {}",
        predictions.len(),
        model_type
    );
    Ok(Json(PredictResponse { predictions }))
}

pub async fn feature_importance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> ApiResult<Json<BTreeMap<String, f64>>> {
    if query.model_type()? != ModelType::RandomForest {
        return Err(ApiError::BadRequest(
            "Feature importance only available for Random Forest.".to_string(),
        ));
    }
    let weights = state
        .model(ModelType::RandomForest)
        .feature_importance()
        .map_err(|e| ApiError::Internal(format!("Feature importance failed: {}", e)))?;
    Ok(Json(weights.into_iter().collect()))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "requests_handled": state.requests_handled(),
    }))
}
