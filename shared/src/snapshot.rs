//! Immutable, validated copy of the forecast dataset

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::error::SnapshotError;
use crate::models::{GridCellForecast, MetricName, RawForecastRow, ALL_METRICS};
use crate::types::YearMonth;

/// Metric columns physically present in the backing store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSchema {
    columns: BTreeSet<MetricName>,
}

impl MetricSchema {
    /// Schema carrying every catalog metric
    pub fn all() -> Self {
        Self {
            columns: ALL_METRICS.into_iter().collect(),
        }
    }

    /// Schema from column names; non-metric columns are ignored
    pub fn from_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: names
                .into_iter()
                .filter_map(|name| MetricName::lookup(name.as_ref().trim()))
                .collect(),
        }
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.columns.contains(&metric)
    }

    /// Columns in canonical order
    pub fn columns(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.columns.iter().copied()
    }

    /// Columns present in both schemas
    pub fn intersect(&self, other: &MetricSchema) -> MetricSchema {
        Self {
            columns: self.columns.intersection(&other.columns).copied().collect(),
        }
    }
}

/// Validated records plus the schema they were loaded with
#[derive(Debug, Clone)]
pub struct ForecastSnapshot {
    records: Vec<GridCellForecast>,
    schema: MetricSchema,
}

impl ForecastSnapshot {
    /// Validate raw rows in order, failing on the first invalid one.
    ///
    /// Metric values in columns outside `schema` are discarded.
    pub fn from_rows(
        schema: MetricSchema,
        rows: Vec<RawForecastRow>,
    ) -> Result<Self, SnapshotError> {
        let mut seen: HashSet<(u64, YearMonth)> = HashSet::with_capacity(rows.len());
        let mut records = Vec::with_capacity(rows.len());

        for (row, mut raw) in rows.into_iter().enumerate() {
            for metric in ALL_METRICS {
                if !schema.contains(metric) {
                    raw.set_metric(metric, None);
                }
            }

            let record = GridCellForecast::try_from(raw)
                .map_err(|source| SnapshotError::InvalidRecord { row, source })?;

            if !seen.insert((record.grid_id(), record.month())) {
                return Err(SnapshotError::DuplicateRecord {
                    grid_id: record.grid_id(),
                    month: record.month().to_string(),
                });
            }
            records.push(record);
        }

        Ok(Self { records, schema })
    }

    /// An empty snapshot with the full schema
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            schema: MetricSchema::all(),
        }
    }

    pub fn records(&self) -> &[GridCellForecast] {
        &self.records
    }

    pub fn schema(&self) -> &MetricSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;

    fn raw(grid_id: i64, month: &str, map: f64) -> RawForecastRow {
        RawForecastRow {
            grid_id,
            latitude: 1.0,
            longitude: 2.0,
            country_id: "800".to_string(),
            month: month.to_string(),
            map: Some(map),
            prob_1: Some(0.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_schema_from_columns_ignores_identifiers() {
        let schema = MetricSchema::from_columns(["grid_id", "month", "map", " prob_1 "]);
        let columns: Vec<MetricName> = schema.columns().collect();
        assert_eq!(columns, vec![MetricName::Map, MetricName::Prob1]);
    }

    #[test]
    fn test_schema_intersection() {
        let left = MetricSchema::from_columns(["map", "prob_1"]);
        let right = MetricSchema::from_columns(["map", "prob_10"]);
        let both = left.intersect(&right);
        assert!(both.contains(MetricName::Map));
        assert!(!both.contains(MetricName::Prob1));
    }

    #[test]
    fn test_snapshot_keeps_row_order() {
        let snapshot = ForecastSnapshot::from_rows(
            MetricSchema::all(),
            vec![raw(2, "2024-01", 1.0), raw(1, "2024-01", 2.0)],
        )
        .unwrap();
        let ids: Vec<u64> = snapshot.records().iter().map(|r| r.grid_id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_snapshot_reports_invalid_row_index() {
        let mut bad = raw(3, "2024-01", 1.0);
        bad.prob_1 = Some(2.0);
        let err = ForecastSnapshot::from_rows(
            MetricSchema::all(),
            vec![raw(1, "2024-01", 1.0), bad],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::InvalidRecord {
                row: 1,
                source: RecordError::ProbabilityOutOfRange { .. }
            }
        ));
    }

    #[test]
    fn test_snapshot_rejects_duplicate_cell_month() {
        let err = ForecastSnapshot::from_rows(
            MetricSchema::all(),
            vec![raw(1, "2024-01", 1.0), raw(1, "2024-01", 2.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SnapshotError::DuplicateRecord {
                grid_id: 1,
                month: "2024-01".to_string()
            }
        );
    }

    #[test]
    fn test_values_outside_schema_are_dropped() {
        let snapshot = ForecastSnapshot::from_rows(
            MetricSchema::from_columns(["map"]),
            vec![raw(1, "2024-01", 4.0)],
        )
        .unwrap();
        let metrics = snapshot.records()[0].metrics();
        assert_eq!(metrics.map(), Some(4.0));
        assert_eq!(metrics.get(MetricName::Prob1), None);
    }
}
