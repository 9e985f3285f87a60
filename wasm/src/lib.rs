//! WebAssembly module for the VIEWS forecast API
//!
//! Lets browser clients check query parameters before sending them:
//! - Metric catalog lookup
//! - Country code and month validation
//! - Month range expansion
//! - Metric filter parsing
//! - Full query validation

use serde_json::json;
use shared::error::QueryError;
use shared::models::{metric_catalog, ForecastQuery, ALL_METRICS};
use shared::validation;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&JsValue::from_str("forecast-api-wasm loaded"));
}

fn to_js_error(err: QueryError) -> JsValue {
    JsValue::from(js_sys::Error::new(&format!("{}: {}", err.code(), err)))
}

/// Metric names in catalog order, as a JSON array
#[wasm_bindgen]
pub fn metric_names() -> String {
    let names: Vec<&str> = ALL_METRICS.iter().map(|m| m.as_str()).collect();
    json!(names).to_string()
}

/// Metric catalog with value domains, as JSON
#[wasm_bindgen]
pub fn metric_catalog_json() -> String {
    serde_json::to_string(&metric_catalog()).unwrap_or_else(|_| "[]".to_string())
}

/// Check a UN M49 country code
#[wasm_bindgen]
pub fn is_valid_country_code(code: &str) -> bool {
    validation::validate_country_code(code).is_ok()
}

/// Check a `YYYY-MM` month
#[wasm_bindgen]
pub fn is_valid_month(month: &str) -> bool {
    validation::parse_month(month).is_ok()
}

/// Expand `YYYY-MM:YYYY-MM` into a JSON array of months
#[wasm_bindgen]
pub fn expand_month_range(range: &str) -> Result<String, JsValue> {
    month_range_json(range).map_err(to_js_error)
}

/// Parse a filter such as `map>50` into `{metric, operator, value}`
#[wasm_bindgen]
pub fn parse_metric_filter(expression: &str) -> Result<String, JsValue> {
    metric_filter_json(expression).map_err(to_js_error)
}

/// Validate a JSON-encoded query and return its normalized echo
#[wasm_bindgen]
pub fn validate_forecast_query(query_json: &str) -> Result<String, JsValue> {
    let raw: ForecastQuery = serde_json::from_str(query_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid query JSON: {}", e)))?;
    normalized_query_json(&raw).map_err(to_js_error)
}

fn month_range_json(range: &str) -> Result<String, QueryError> {
    let months: Vec<String> = validation::expand_month_range(range)?
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(json!(months).to_string())
}

fn metric_filter_json(expression: &str) -> Result<String, QueryError> {
    let constraint = validation::parse_metric_filter(expression)?;
    Ok(json!({
        "metric": constraint.metric.as_str(),
        "operator": constraint.operator.symbol(),
        "value": constraint.value,
    })
    .to_string())
}

fn normalized_query_json(raw: &ForecastQuery) -> Result<String, QueryError> {
    let query = raw.validate()?;
    Ok(serde_json::to_value(&query)
        .map(|v| v.to_string())
        .unwrap_or_default())
}
