//! Aggregate statistics over forecast result sets

use std::collections::{BTreeSet, HashSet};

use crate::models::{ForecastSummary, GridCellForecast, MapSummary};

/// Summarize a result set.
///
/// MAP statistics cover only records that carry a MAP value. With none,
/// the average is `0.0` and min/max are `None`.
pub fn summarize(records: &[GridCellForecast]) -> ForecastSummary {
    let countries: BTreeSet<_> = records.iter().map(|r| r.country_id().clone()).collect();
    let months: BTreeSet<_> = records.iter().map(|r| r.month()).collect();
    let grid_cells: HashSet<u64> = records.iter().map(|r| r.grid_id()).collect();

    ForecastSummary {
        count: records.len(),
        countries: countries.into_iter().collect(),
        months: months.into_iter().collect(),
        grid_cells: grid_cells.len(),
        metrics_summary: map_summary(records.iter().filter_map(|r| r.metrics().map())),
    }
}

fn map_summary(values: impl Iterator<Item = f64>) -> MapSummary {
    let (mut sum, mut count) = (0.0, 0usize);
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    for value in values {
        sum += value;
        count += 1;
        min = Some(min.map_or(value, |m| m.min(value)));
        max = Some(max.map_or(value, |m| m.max(value)));
    }

    let avg = if count == 0 { 0.0 } else { sum / count as f64 };
    MapSummary {
        avg_map: round2(avg),
        min_map: min.map(round2),
        max_map: max.map(round2),
    }
}

/// Round to two decimals, exact ties going to the even digit
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
