//! Evaluation of validated queries against a snapshot

use std::collections::HashSet;

use crate::error::EvaluationError;
use crate::models::{GridCellForecast, MetricName, ValidatedQuery};
use crate::snapshot::ForecastSnapshot;

/// Apply a validated query to a snapshot.
///
/// Filters are conjunctive: country, grid ids, months (explicit months
/// unioned with the range), then metric constraints, which see the full
/// row before projection. Output keeps snapshot order.
pub fn evaluate(
    snapshot: &ForecastSnapshot,
    query: &ValidatedQuery,
) -> Result<Vec<GridCellForecast>, EvaluationError> {
    if let Some(missing) = query
        .metric_filters
        .iter()
        .find(|c| !snapshot.schema().contains(c.metric))
    {
        return Err(EvaluationError::MissingMetricColumn(missing.metric));
    }

    let grid_ids: Option<HashSet<u64>> = query
        .grid_ids
        .as_ref()
        .map(|ids| ids.iter().copied().collect());
    let months = query.month_filter();
    let projection = query.projection();

    snapshot
        .records()
        .iter()
        .filter(|r| query.country.as_ref().map_or(true, |c| r.country_id() == c))
        .filter(|r| grid_ids.as_ref().map_or(true, |ids| ids.contains(&r.grid_id())))
        .filter(|r| months.as_ref().map_or(true, |m| m.contains(&r.month())))
        .filter(|r| query.metric_filters.iter().all(|c| c.matches(r.metrics())))
        .map(|r| project(r, projection))
        .collect()
}

fn project(
    record: &GridCellForecast,
    projection: &[MetricName],
) -> Result<GridCellForecast, EvaluationError> {
    let metrics = record
        .metrics()
        .project(projection)
        .map_err(|_| EvaluationError::EmptyProjection {
            grid_id: record.grid_id(),
            month: record.month().to_string(),
        })?;
    Ok(record.with_metrics(metrics))
}
