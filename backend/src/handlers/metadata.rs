//! HTTP handlers for dataset discovery

use std::str::FromStr;

use axum::{extract::State, Json};
use axum_extra::extract::{Query, WithRejection};
use serde::Deserialize;
use shared::models::{
    metric_catalog, CountriesResponse, GridCellsResponse, MetricsResponse, MonthsResponse,
};
use shared::types::CountryCode;

use crate::error::{AppError, AppResult};
use crate::services::ForecastService;
use crate::AppState;

/// Months with forecast data
pub async fn get_months(State(state): State<AppState>) -> AppResult<Json<MonthsResponse>> {
    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    let data = service.available_months().await?;
    Ok(Json(MonthsResponse {
        count: data.len(),
        data,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct GridCellsParams {
    #[serde(default)]
    pub country: Option<String>,
}

/// Grid cells, optionally limited to one country
pub async fn get_grid_cells(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<GridCellsParams>, AppError>,
) -> AppResult<Json<GridCellsResponse>> {
    let country = params
        .country
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(CountryCode::from_str)
        .transpose()?;

    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    Ok(Json(service.grid_cells(country.as_ref()).await?))
}

/// Countries with forecast data
pub async fn get_countries(State(state): State<AppState>) -> AppResult<Json<CountriesResponse>> {
    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    let countries = service.countries().await?;
    Ok(Json(CountriesResponse {
        count: countries.len(),
        countries,
    }))
}

/// The metric catalog
pub async fn get_metrics() -> Json<MetricsResponse> {
    let data = metric_catalog();
    Json(MetricsResponse {
        count: data.len(),
        data,
    })
}
