//! Forecast query descriptors

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::models::{MetricConstraint, MetricName, ALL_METRICS};
use crate::types::{CountryCode, MonthRange, YearMonth};
use crate::validation;

/// Response encoding requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Ndjson,
}

impl FromStr for OutputFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(OutputFormat::Json),
            "ndjson" => Ok(OutputFormat::Ndjson),
            other => Err(QueryError::InvalidFormat(other.to_string())),
        }
    }
}

/// Query parameters as received, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub grid_ids: Vec<u64>,
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub month_range: Option<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub metric_filters: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl ForecastQuery {
    /// Validate and normalize, failing on the first invalid parameter
    pub fn validate(&self) -> Result<ValidatedQuery, QueryError> {
        let country = self
            .country
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(CountryCode::from_str)
            .transpose()?;

        let grid_ids = (!self.grid_ids.is_empty()).then(|| self.grid_ids.clone());

        let months = if self.months.is_empty() {
            None
        } else {
            Some(
                self.months
                    .iter()
                    .map(|m| validation::parse_month(m))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };

        let month_range = self
            .month_range
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(validation::parse_month_range)
            .transpose()?;

        let metrics = if self.metrics.is_empty() {
            None
        } else {
            Some(validation::normalize_metrics(&self.metrics)?)
        };

        let constraints = self
            .metric_filters
            .iter()
            .map(|expr| validation::parse_metric_filter(expr))
            .collect::<Result<Vec<_>, _>>()?;

        let format = self
            .format
            .as_deref()
            .map(OutputFormat::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok(ValidatedQuery {
            country,
            grid_ids,
            months,
            month_range,
            metrics,
            metric_filters: constraints,
            format,
        })
    }
}

/// A normalized query; serializes as the echo returned to clients
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValidatedQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<CountryCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_ids: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<YearMonth>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_range: Option<MonthRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetricName>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metric_filters: Vec<MetricConstraint>,
    pub format: OutputFormat,
}

impl ValidatedQuery {
    /// Union of explicit months and the expanded range, or `None` when
    /// neither was given
    pub fn month_filter(&self) -> Option<BTreeSet<YearMonth>> {
        if self.months.is_none() && self.month_range.is_none() {
            return None;
        }

        let mut months: BTreeSet<YearMonth> =
            self.months.iter().flatten().copied().collect();
        if let Some(range) = &self.month_range {
            months.extend(range.months());
        }
        Some(months)
    }

    /// Requested metrics, or the whole catalog
    pub fn projection(&self) -> &[MetricName] {
        self.metrics.as_deref().unwrap_or(&ALL_METRICS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComparisonOperator;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_query_validates_to_defaults() {
        let query = ForecastQuery::default().validate().unwrap();
        assert_eq!(query, ValidatedQuery::default());
        assert!(query.month_filter().is_none());
        assert_eq!(query.projection().len(), 13);
    }

    #[test]
    fn test_full_query_validates() {
        let raw = ForecastQuery {
            country: Some("800".to_string()),
            grid_ids: vec![1, 2],
            months: strings(&["2024-01"]),
            month_range: Some("2024-03:2024-04".to_string()),
            metrics: strings(&["map", "map", "prob_1"]),
            metric_filters: strings(&["map>50", "prob_1>=0.5"]),
            format: Some("ndjson".to_string()),
        };
        let query = raw.validate().unwrap();

        assert_eq!(query.country.as_ref().unwrap().as_str(), "800");
        assert_eq!(query.grid_ids, Some(vec![1, 2]));
        assert_eq!(query.projection(), &[MetricName::Map, MetricName::Prob1]);
        assert_eq!(query.metric_filters.len(), 2);
        assert_eq!(
            query.metric_filters[1].operator,
            ComparisonOperator::GreaterOrEqual
        );
        assert_eq!(query.format, OutputFormat::Ndjson);

        let months: Vec<String> = query
            .month_filter()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(months, ["2024-01", "2024-03", "2024-04"]);
    }

    #[test]
    fn test_months_and_range_are_unioned() {
        let raw = ForecastQuery {
            months: strings(&["2024-02", "2024-06"]),
            month_range: Some("2024-01:2024-03".to_string()),
            ..Default::default()
        };
        let months = raw.validate().unwrap().month_filter().unwrap();
        assert_eq!(months.len(), 4);
    }

    #[test]
    fn test_each_parameter_rejects_invalid_input() {
        let cases = [
            (
                ForecastQuery {
                    country: Some("UGA".to_string()),
                    ..Default::default()
                },
                "country",
            ),
            (
                ForecastQuery {
                    months: strings(&["2024-01", "January"]),
                    ..Default::default()
                },
                "months",
            ),
            (
                ForecastQuery {
                    month_range: Some("2024-05:2024-01".to_string()),
                    ..Default::default()
                },
                "month_range",
            ),
            (
                ForecastQuery {
                    metrics: strings(&["map", "bogus"]),
                    ..Default::default()
                },
                "metrics",
            ),
            (
                ForecastQuery {
                    metric_filters: strings(&["map>>50"]),
                    ..Default::default()
                },
                "metric_filters",
            ),
            (
                ForecastQuery {
                    format: Some("csv".to_string()),
                    ..Default::default()
                },
                "format",
            ),
        ];

        for (raw, field) in cases {
            let err = raw.validate().unwrap_err();
            assert_eq!(err.field(), field, "{err}");
        }
    }

    #[test]
    fn test_echo_omits_unset_parameters() {
        let raw = ForecastQuery {
            country: Some("074".to_string()),
            metric_filters: strings(&["map>50"]),
            ..Default::default()
        };
        let echo = serde_json::to_value(raw.validate().unwrap()).unwrap();
        assert_eq!(
            echo,
            serde_json::json!({
                "country": "074",
                "metric_filters": ["map>50"],
                "format": "json"
            })
        );
    }
}
