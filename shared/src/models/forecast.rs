//! Grid cell forecast records

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::models::{ForecastMetrics, MetricName, ALL_METRICS};
use crate::types::{CountryCode, YearMonth};

/// One flat row as delivered by a data source, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastRow {
    pub grid_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: String,
    #[serde(default)]
    pub admin_1_id: Option<String>,
    #[serde(default)]
    pub admin_2_id: Option<String>,
    pub month: String,
    #[serde(default)]
    pub map: Option<f64>,
    #[serde(default)]
    pub ci_50_low: Option<f64>,
    #[serde(default)]
    pub ci_50_high: Option<f64>,
    #[serde(default)]
    pub ci_90_low: Option<f64>,
    #[serde(default)]
    pub ci_90_high: Option<f64>,
    #[serde(default)]
    pub ci_99_low: Option<f64>,
    #[serde(default)]
    pub ci_99_high: Option<f64>,
    #[serde(default)]
    pub prob_0: Option<f64>,
    #[serde(default)]
    pub prob_1: Option<f64>,
    #[serde(default)]
    pub prob_10: Option<f64>,
    #[serde(default)]
    pub prob_100: Option<f64>,
    #[serde(default)]
    pub prob_1000: Option<f64>,
    #[serde(default)]
    pub prob_10000: Option<f64>,
}

impl RawForecastRow {
    /// Raw value of a metric column
    pub fn metric(&self, name: MetricName) -> Option<f64> {
        match name {
            MetricName::Map => self.map,
            MetricName::Ci50Low => self.ci_50_low,
            MetricName::Ci50High => self.ci_50_high,
            MetricName::Ci90Low => self.ci_90_low,
            MetricName::Ci90High => self.ci_90_high,
            MetricName::Ci99Low => self.ci_99_low,
            MetricName::Ci99High => self.ci_99_high,
            MetricName::Prob0 => self.prob_0,
            MetricName::Prob1 => self.prob_1,
            MetricName::Prob10 => self.prob_10,
            MetricName::Prob100 => self.prob_100,
            MetricName::Prob1000 => self.prob_1000,
            MetricName::Prob10000 => self.prob_10000,
        }
    }

    pub fn set_metric(&mut self, name: MetricName, value: Option<f64>) {
        let slot = match name {
            MetricName::Map => &mut self.map,
            MetricName::Ci50Low => &mut self.ci_50_low,
            MetricName::Ci50High => &mut self.ci_50_high,
            MetricName::Ci90Low => &mut self.ci_90_low,
            MetricName::Ci90High => &mut self.ci_90_high,
            MetricName::Ci99Low => &mut self.ci_99_low,
            MetricName::Ci99High => &mut self.ci_99_high,
            MetricName::Prob0 => &mut self.prob_0,
            MetricName::Prob1 => &mut self.prob_1,
            MetricName::Prob10 => &mut self.prob_10,
            MetricName::Prob100 => &mut self.prob_100,
            MetricName::Prob1000 => &mut self.prob_1000,
            MetricName::Prob10000 => &mut self.prob_10000,
        };
        *slot = value;
    }
}

/// One (grid cell x month) observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCellForecast {
    grid_id: u64,
    latitude: f64,
    longitude: f64,
    country_id: CountryCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_1_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_2_id: Option<String>,
    month: YearMonth,
    metrics: ForecastMetrics,
}

impl GridCellForecast {
    pub fn grid_id(&self) -> u64 {
        self.grid_id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn country_id(&self) -> &CountryCode {
        &self.country_id
    }

    pub fn admin_1_id(&self) -> Option<&str> {
        self.admin_1_id.as_deref()
    }

    pub fn admin_2_id(&self) -> Option<&str> {
        self.admin_2_id.as_deref()
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn metrics(&self) -> &ForecastMetrics {
        &self.metrics
    }

    /// Same record with its metrics replaced by a projection
    pub fn with_metrics(&self, metrics: ForecastMetrics) -> Self {
        Self {
            metrics,
            ..self.clone()
        }
    }
}

impl TryFrom<RawForecastRow> for GridCellForecast {
    type Error = RecordError;

    fn try_from(row: RawForecastRow) -> Result<Self, Self::Error> {
        if row.grid_id <= 0 {
            return Err(RecordError::InvalidGridId(row.grid_id));
        }
        if !(-90.0..=90.0).contains(&row.latitude) {
            return Err(RecordError::LatitudeOutOfRange(row.latitude));
        }
        if !(-180.0..=180.0).contains(&row.longitude) {
            return Err(RecordError::LongitudeOutOfRange(row.longitude));
        }
        let country_id: CountryCode = row
            .country_id
            .parse()
            .map_err(|_| RecordError::InvalidCountryId(row.country_id.clone()))?;
        let month: YearMonth = row
            .month
            .parse()
            .map_err(|_| RecordError::InvalidMonth(row.month.clone()))?;

        let metrics = ForecastMetrics::try_new(
            ALL_METRICS
                .iter()
                .filter_map(|&name| row.metric(name).map(|value| (name, value))),
        )?;

        Ok(Self {
            grid_id: row.grid_id as u64,
            latitude: row.latitude,
            longitude: row.longitude,
            country_id,
            admin_1_id: row.admin_1_id.filter(|id| !id.is_empty()),
            admin_2_id: row.admin_2_id.filter(|id| !id.is_empty()),
            month,
            metrics,
        })
    }
}
