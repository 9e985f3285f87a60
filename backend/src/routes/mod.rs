//! Route definitions for the VIEWS forecast API

use axum::{middleware, routing::get, Router};

use crate::{handlers, middleware::api_key_middleware, AppState};

/// Create API routes, all guarded by the API key check
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(forecast_routes())
        .nest("/metadata", metadata_routes())
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

/// Forecast query routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route("/forecasts", get(handlers::get_forecasts))
        .route("/forecasts/summary", get(handlers::get_forecast_summary))
}

/// Dataset discovery routes
fn metadata_routes() -> Router<AppState> {
    Router::new()
        .route("/months", get(handlers::get_months))
        .route("/grid-cells", get(handlers::get_grid_cells))
        .route("/countries", get(handlers::get_countries))
        .route("/metrics", get(handlers::get_metrics))
}
