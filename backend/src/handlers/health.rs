//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::services::ForecastService;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub records: usize,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
    })
}

/// Ready once a snapshot can be served; 503 otherwise
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<ReadinessResponse>> {
    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    let records = service.record_count().await?;
    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        records,
    }))
}

/// Root endpoint
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let prefix = &state.config.api.prefix;
    let endpoints = [
        "/forecasts",
        "/forecasts/summary",
        "/metadata/months",
        "/metadata/grid-cells",
        "/metadata/countries",
        "/metadata/metrics",
    ]
    .iter()
    .map(|path| format!("{}{}", prefix, path))
    .chain(["/health".to_string(), "/ready".to_string()])
    .collect();

    Json(ServiceInfo {
        name: "VIEWS Forecast API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}
