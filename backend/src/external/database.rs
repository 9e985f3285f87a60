//! Relational backend: the `forecasts` table in PostgreSQL

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{RawForecastRow, ALL_METRICS};
use shared::snapshot::MetricSchema;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row};

use super::{ForecastSource, SourceBatch, SourceError, REQUIRED_COLUMNS};
use crate::config::DatabaseConfig;

const SELECT_FORECASTS: &str = "SELECT * FROM forecasts ORDER BY month, grid_id";

#[derive(Clone)]
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pool that connects on first use, so startup does not need the database
    pub fn connect_lazy(url: &str, settings: &DatabaseConfig) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_lazy(url)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ForecastSource for PostgresSource {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn load_snapshot(&self) -> Result<SourceBatch, SourceError> {
        let rows = sqlx::query(SELECT_FORECASTS).fetch_all(&self.pool).await?;

        let Some(first) = rows.first() else {
            return Ok(SourceBatch::empty());
        };

        let names: Vec<&str> = first.columns().iter().map(|c| c.name()).collect();
        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !names.contains(*c)) {
            return Err(SourceError::MissingColumn(missing.to_string()));
        }
        let columns = MetricSchema::from_columns(&names);
        let has_admin_1 = names.contains(&"admin_1_id");
        let has_admin_2 = names.contains(&"admin_2_id");

        let rows = rows
            .iter()
            .map(|row| decode_row(row, &columns, has_admin_1, has_admin_2))
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(SourceBatch { columns, rows })
    }
}

fn decode_row(
    row: &PgRow,
    columns: &MetricSchema,
    has_admin_1: bool,
    has_admin_2: bool,
) -> Result<RawForecastRow, sqlx::Error> {
    let mut raw = RawForecastRow {
        grid_id: integer_column(row, "grid_id")?,
        latitude: required_float(row, "latitude")?,
        longitude: required_float(row, "longitude")?,
        country_id: row.try_get("country_id")?,
        admin_1_id: if has_admin_1 { row.try_get("admin_1_id")? } else { None },
        admin_2_id: if has_admin_2 { row.try_get("admin_2_id")? } else { None },
        month: month_column(row)?,
        ..Default::default()
    };

    for metric in ALL_METRICS {
        if columns.contains(metric) {
            raw.set_metric(metric, float_column(row, metric.as_str())?);
        }
    }

    Ok(raw)
}

fn integer_column(row: &PgRow, name: &str) -> Result<i64, sqlx::Error> {
    row.try_get::<i64, _>(name)
        .or_else(|_| row.try_get::<i32, _>(name).map(i64::from))
}

fn required_float(row: &PgRow, name: &str) -> Result<f64, sqlx::Error> {
    row.try_get::<f64, _>(name)
        .or_else(|_| row.try_get::<f32, _>(name).map(f64::from))
}

fn float_column(row: &PgRow, name: &str) -> Result<Option<f64>, sqlx::Error> {
    row.try_get::<Option<f64>, _>(name)
        .or_else(|_| row.try_get::<Option<f32>, _>(name).map(|v| v.map(f64::from)))
}

/// Months may be stored as `YYYY-MM` text or as a date
fn month_column(row: &PgRow) -> Result<String, sqlx::Error> {
    row.try_get::<String, _>("month").or_else(|_| {
        row.try_get::<NaiveDate, _>("month")
            .map(|date| date.format("%Y-%m").to_string())
    })
}
