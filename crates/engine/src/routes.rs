use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;

use veracity_common::api::analyze::{AnalyzeRequest, ErrorResponse, HealthResponse};

use crate::pipeline::{Pipeline, PipelineError};

/// Shared application state accessible from axum handlers.
pub struct AppState {
    pub pipeline: Pipeline,
    pub metrics_handle: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// POST /api/analyze: full credibility assessment of the submitted text.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    match state.pipeline.analyze(&request.text).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: PipelineError) -> Response {
    let status = match e {
        PipelineError::EmptyInput => StatusCode::BAD_REQUEST,
        PipelineError::ReasoningUnavailable { .. } | PipelineError::VerdictUnparseable { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };

    let error = e.to_string();
    let kind = e.kind().to_string();
    let raw = match e {
        PipelineError::VerdictUnparseable { raw } => Some(raw),
        _ => None,
    };

    (status, Json(ErrorResponse { error, kind, raw })).into_response()
}

/// Health check. Degraded when no reasoning engine is configured.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reasoning_engine = state.pipeline.engine_description().is_some();
    let providers = state
        .pipeline
        .available_providers()
        .into_iter()
        .map(|p| p.as_str().to_string())
        .collect();

    Json(HealthResponse {
        status: if reasoning_engine { "ok" } else { "degraded" }.to_string(),
        reasoning_engine,
        providers,
    })
}

/// Prometheus metrics endpoint.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
