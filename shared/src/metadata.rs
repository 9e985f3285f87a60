//! Discovery views derived from a snapshot

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{GridCellForecast, GridCellMetadata, MonthMetadata};
use crate::types::{CountryCode, YearMonth};

/// Unique grid cells sorted by id, optionally limited to one country.
///
/// Location fields come from the first record seen for each cell.
pub fn grid_cells(
    records: &[GridCellForecast],
    country: Option<&CountryCode>,
) -> Vec<GridCellMetadata> {
    let mut cells: BTreeMap<u64, GridCellMetadata> = BTreeMap::new();

    for record in records {
        if country.is_some_and(|c| record.country_id() != c) {
            continue;
        }
        cells
            .entry(record.grid_id())
            .or_insert_with(|| GridCellMetadata {
                grid_id: record.grid_id(),
                latitude: record.latitude(),
                longitude: record.longitude(),
                country_id: record.country_id().clone(),
                admin_1_id: record.admin_1_id().map(str::to_string),
                admin_2_id: record.admin_2_id().map(str::to_string),
            });
    }

    cells.into_values().collect()
}

/// Months with data, ascending, with record counts and covered countries
pub fn available_months(records: &[GridCellForecast]) -> Vec<MonthMetadata> {
    let mut months: BTreeMap<YearMonth, (usize, BTreeSet<CountryCode>)> = BTreeMap::new();

    for record in records {
        let (count, countries) = months.entry(record.month()).or_default();
        *count += 1;
        countries.insert(record.country_id().clone());
    }

    months
        .into_iter()
        .map(|(month, (forecast_count, countries))| MonthMetadata {
            month,
            forecast_count,
            countries: countries.into_iter().collect(),
        })
        .collect()
}

/// Distinct country codes, ascending
pub fn countries(records: &[GridCellForecast]) -> Vec<CountryCode> {
    records
        .iter()
        .map(|r| r.country_id().clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
