//! HTTP handlers for forecast queries

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use shared::models::{ForecastQuery, ForecastResponse, ForecastSummary, GridCellForecast, OutputFormat};

use crate::error::{AppError, AppResult};
use crate::services::ForecastService;
use crate::AppState;

/// Total record count for responses without an envelope
pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Query forecasts
///
/// `format=ndjson` streams one record per line with the count in `X-Total-Count`.
pub async fn get_forecasts(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ForecastQuery>, AppError>,
) -> AppResult<Response> {
    let query = params.validate()?;
    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    let records = service.query(&query).await?;

    let format = query.format;
    match format {
        OutputFormat::Json => Ok(Json(ForecastResponse::new(records, query)).into_response()),
        OutputFormat::Ndjson => ndjson_response(&records, state.config.expose_error_detail()),
    }
}

/// Summary statistics for the forecasts matching the query
pub async fn get_forecast_summary(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<ForecastQuery>, AppError>,
) -> AppResult<Json<ForecastSummary>> {
    let query = params.validate()?;
    let service = ForecastService::new(state.cache.clone(), state.config.expose_error_detail());
    let summary = service.summary(&query).await?;
    Ok(Json(summary))
}

fn ndjson_response(records: &[GridCellForecast], expose_error_detail: bool) -> AppResult<Response> {
    let mut body = Vec::with_capacity(records.len() * 256);
    for record in records {
        serde_json::to_writer(&mut body, record).map_err(|e| {
            AppError::internal("Failed to encode forecast record", e, expose_error_detail)
        })?;
        body.push(b'\n');
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(NDJSON_CONTENT_TYPE)),
            (X_TOTAL_COUNT, HeaderValue::from(records.len())),
        ],
        body,
    )
        .into_response())
}
