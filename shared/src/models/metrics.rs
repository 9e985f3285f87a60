//! Forecast metric catalog and per-row metric values

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, RecordError};

/// The thirteen supported forecast metrics, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricName {
    /// Most Accurate Prediction
    #[serde(rename = "map")]
    Map,
    #[serde(rename = "ci_50_low")]
    Ci50Low,
    #[serde(rename = "ci_50_high")]
    Ci50High,
    #[serde(rename = "ci_90_low")]
    Ci90Low,
    #[serde(rename = "ci_90_high")]
    Ci90High,
    #[serde(rename = "ci_99_low")]
    Ci99Low,
    #[serde(rename = "ci_99_high")]
    Ci99High,
    /// Probability of 0 fatalities
    #[serde(rename = "prob_0")]
    Prob0,
    /// Probability of 1+ fatalities
    #[serde(rename = "prob_1")]
    Prob1,
    /// Probability of 10+ fatalities
    #[serde(rename = "prob_10")]
    Prob10,
    /// Probability of 100+ fatalities
    #[serde(rename = "prob_100")]
    Prob100,
    /// Probability of 1000+ fatalities
    #[serde(rename = "prob_1000")]
    Prob1000,
    /// Probability of 10000+ fatalities
    #[serde(rename = "prob_10000")]
    Prob10000,
}

/// Canonical ordered list of all metrics; the default projection
pub const ALL_METRICS: [MetricName; 13] = [
    MetricName::Map,
    MetricName::Ci50Low,
    MetricName::Ci50High,
    MetricName::Ci90Low,
    MetricName::Ci90High,
    MetricName::Ci99Low,
    MetricName::Ci99High,
    MetricName::Prob0,
    MetricName::Prob1,
    MetricName::Prob10,
    MetricName::Prob100,
    MetricName::Prob1000,
    MetricName::Prob10000,
];

/// Confidence interval bounds that must satisfy `low <= high`
pub const INTERVAL_PAIRS: [(MetricName, MetricName); 3] = [
    (MetricName::Ci50Low, MetricName::Ci50High),
    (MetricName::Ci90Low, MetricName::Ci90High),
    (MetricName::Ci99Low, MetricName::Ci99High),
];

/// Range of values a metric may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDomain {
    /// Point and interval estimates: `[0, inf)`
    NonNegative,
    /// Exceedance probabilities: `[0, 1]`
    UnitInterval,
}

impl MetricDomain {
    pub fn contains(&self, value: f64) -> bool {
        match self {
            MetricDomain::NonNegative => value >= 0.0,
            MetricDomain::UnitInterval => (0.0..=1.0).contains(&value),
        }
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Map => "map",
            MetricName::Ci50Low => "ci_50_low",
            MetricName::Ci50High => "ci_50_high",
            MetricName::Ci90Low => "ci_90_low",
            MetricName::Ci90High => "ci_90_high",
            MetricName::Ci99Low => "ci_99_low",
            MetricName::Ci99High => "ci_99_high",
            MetricName::Prob0 => "prob_0",
            MetricName::Prob1 => "prob_1",
            MetricName::Prob10 => "prob_10",
            MetricName::Prob100 => "prob_100",
            MetricName::Prob1000 => "prob_1000",
            MetricName::Prob10000 => "prob_10000",
        }
    }

    pub fn domain(&self) -> MetricDomain {
        match self {
            MetricName::Prob0
            | MetricName::Prob1
            | MetricName::Prob10
            | MetricName::Prob100
            | MetricName::Prob1000
            | MetricName::Prob10000 => MetricDomain::UnitInterval,
            _ => MetricDomain::NonNegative,
        }
    }

    /// Position in [`ALL_METRICS`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a catalog entry by its wire name
    pub fn lookup(name: &str) -> Option<Self> {
        ALL_METRICS.iter().copied().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| QueryError::UnknownMetric(s.to_string()))
    }
}

/// Catalog entry as exposed by the discovery endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    pub name: MetricName,
    pub domain: MetricDomain,
}

/// Catalog listing in canonical order
pub fn metric_catalog() -> Vec<MetricInfo> {
    ALL_METRICS
        .iter()
        .map(|&name| MetricInfo {
            name,
            domain: name.domain(),
        })
        .collect()
}

/// Metric values for one forecast row.
///
/// Values are only reachable through [`ForecastMetrics::try_new`] and
/// [`ForecastMetrics::project`], both of which enforce the domain and
/// interval invariants. Absent metrics are omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_50_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_50_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_90_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_90_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_99_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ci_99_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_100: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_1000: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob_10000: Option<f64>,
}

impl ForecastMetrics {
    /// Build from `(metric, value)` pairs, validating every invariant
    pub fn try_new<I>(values: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (MetricName, f64)>,
    {
        let mut metrics = Self::empty();
        for (name, value) in values {
            *metrics.slot_mut(name) = Some(value);
        }
        metrics.validate()?;
        Ok(metrics)
    }

    fn empty() -> Self {
        Self {
            map: None,
            ci_50_low: None,
            ci_50_high: None,
            ci_90_low: None,
            ci_90_high: None,
            ci_99_low: None,
            ci_99_high: None,
            prob_0: None,
            prob_1: None,
            prob_10: None,
            prob_100: None,
            prob_1000: None,
            prob_10000: None,
        }
    }

    fn slot_mut(&mut self, name: MetricName) -> &mut Option<f64> {
        match name {
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
        }
    }

    /// Value of a metric, if present
    pub fn get(&self, name: MetricName) -> Option<f64> {
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

    pub fn map(&self) -> Option<f64> {
        self.map
    }

    /// Metrics that carry a value, in canonical order
    pub fn present(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        ALL_METRICS
            .iter()
            .filter_map(move |&name| self.get(name).map(|value| (name, value)))
    }

    pub fn len(&self) -> usize {
        self.present().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only the requested metrics.
    ///
    /// Returns [`RecordError::NoMetrics`] when none of them is present.
    pub fn project(&self, metrics: &[MetricName]) -> Result<Self, RecordError> {
        let mut projected = Self::empty();
        for &name in metrics {
            *projected.slot_mut(name) = self.get(name);
        }
        if projected.is_empty() {
            return Err(RecordError::NoMetrics);
        }
        Ok(projected)
    }

    fn validate(&self) -> Result<(), RecordError> {
        for (metric, value) in self.present() {
            if !value.is_finite() {
                return Err(RecordError::NonFiniteMetric { metric, value });
            }
            if !metric.domain().contains(value) {
                return Err(match metric.domain() {
                    MetricDomain::NonNegative => RecordError::NegativeMetric { metric, value },
                    MetricDomain::UnitInterval => {
                        RecordError::ProbabilityOutOfRange { metric, value }
                    }
                });
            }
        }

        for (low, high) in INTERVAL_PAIRS {
            if let (Some(low_value), Some(high_value)) = (self.get(low), self.get(high)) {
                if high_value < low_value {
                    return Err(RecordError::InvertedInterval {
                        low,
                        high,
                        low_value,
                        high_value,
                    });
                }
            }
        }

        if self.is_empty() {
            return Err(RecordError::NoMetrics);
        }
        Ok(())
    }
}
