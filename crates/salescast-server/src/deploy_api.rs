//! Deployed-model service: inference and metadata for the single
//! deployed slot.

use crate::state::{ApiError, AppState};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use salescast_core::{ExperimentParams, MetricsRow};
use salescast_pipeline::{deployed_predictions, predict_range, PredictionsReport};
use salescast_store::{deployment_description, ExperimentRecord};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics))
        .route("/params", get(params))
        .route("/predictions", get(predictions))
        .route("/description", get(description))
        .route("/singlepredict", post(single_predict))
        .route("/rangepredict", post(range_predict))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("deployed-model service listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "salescast deployed-model service" }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Result<Json<MetricsRow>, ApiError> {
    let record = ExperimentRecord::deployed(&state.project.root);
    Ok(Json(record.read_metrics()?))
}

async fn params(State(state): State<Arc<AppState>>) -> Result<Json<ExperimentParams>, ApiError> {
    let record = ExperimentRecord::deployed(&state.project.root);
    Ok(Json(record.read_params()?))
}

async fn predictions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PredictionsReport>, ApiError> {
    let report = deployed_predictions(&state.project)?;
    Ok(Json(report))
}

async fn description(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = deployment_description(&state.project.root)?;
    Ok(Json(json!({ "description": text })))
}

#[derive(Debug, Deserialize)]
struct SinglePredictRequest {
    date: NaiveDate,
}

async fn single_predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SinglePredictRequest>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let rows = predict_range(&state.project, request.date, None)?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct RangePredictRequest {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

async fn range_predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RangePredictRequest>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let rows = predict_range(&state.project, request.start_date, Some(request.end_date))?;
    Ok(Json(rows))
}
