//! Experiment service: browse executions/experiments and promote one to
//! the deployed slot.

use crate::state::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use salescast_core::{ExperimentParams, MetricsRow};
use salescast_pipeline::{experiment_predictions, PredictionsReport};
use salescast_store::{deploy, list_executions, list_experiments, DeployOutcome, ExperimentRecord};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/executions", get(executions))
        .route("/experiments/:execution", get(experiments))
        .route("/metrics/:execution/:id", get(metrics))
        .route("/params/:execution/:id", get(params))
        .route("/predictions/:execution/:id", get(predictions))
        .route("/deploy", post(deploy_experiment))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("experiment service listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "salescast experiment service" }))
}

async fn executions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let executions = list_executions(&state.project.root)?;
    Ok(Json(json!({ "executions": executions })))
}

async fn experiments(
    State(state): State<Arc<AppState>>,
    Path(execution): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let experiments = list_experiments(&state.project.root, &execution)?;
    Ok(Json(json!({ "experiments": experiments })))
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    Path((execution, id)): Path<(String, String)>,
) -> Result<Json<MetricsRow>, ApiError> {
    let record = ExperimentRecord::for_experiment(&state.project.root, &execution, &id);
    Ok(Json(record.read_metrics()?))
}

async fn params(
    State(state): State<Arc<AppState>>,
    Path((execution, id)): Path<(String, String)>,
) -> Result<Json<ExperimentParams>, ApiError> {
    let record = ExperimentRecord::for_experiment(&state.project.root, &execution, &id);
    Ok(Json(record.read_params()?))
}

async fn predictions(
    State(state): State<Arc<AppState>>,
    Path((execution, id)): Path<(String, String)>,
) -> Result<Json<PredictionsReport>, ApiError> {
    let report = experiment_predictions(&state.project, &execution, &id)?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct DeployRequest {
    execution_name: String,
    experiment_id: String,
    description: String,
}

async fn deploy_experiment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeployRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = deploy(
        &state.project.root,
        &request.execution_name,
        &request.experiment_id,
        &request.description,
    )?;
    match outcome {
        DeployOutcome::Success => Ok((
            StatusCode::OK,
            Json(json!({ "message": "model deployment successful" })),
        )),
        DeployOutcome::Failed { missing } => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "message": "model deployment failed",
                "missing_files": missing,
            })),
        )),
    }
}
