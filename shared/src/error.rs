//! Error taxonomy for query validation, record construction and evaluation

use thiserror::Error;

use crate::models::MetricName;

/// Rejected query input. Every variant is attributable to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Country code must be a UN M49 numeric identifier padded to 3 digits, got '{0}'")]
    InvalidCountryCode(String),

    #[error("Invalid month format: '{0}'. Use YYYY-MM")]
    InvalidMonthFormat(String),

    #[error("Month range must be in format YYYY-MM:YYYY-MM, got '{0}'")]
    InvalidRangeFormat(String),

    #[error("Start month {start} must not be after end month {end}")]
    InvalidRangeOrder { start: String, end: String },

    #[error("Unknown metric: '{0}'")]
    UnknownMetric(String),

    #[error("Invalid metric filter '{0}'. Use <metric><op><value> with op one of >=, <=, >, <")]
    InvalidFilterSyntax(String),

    #[error("Invalid value '{value}' in metric filter '{expression}'")]
    InvalidFilterValue { expression: String, value: String },

    #[error("Unsupported response format '{0}'. Use json or ndjson")]
    InvalidFormat(String),
}

impl QueryError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            QueryError::InvalidCountryCode(_) => "country",
            QueryError::InvalidMonthFormat(_) => "months",
            QueryError::InvalidRangeFormat(_) | QueryError::InvalidRangeOrder { .. } => {
                "month_range"
            }
            QueryError::UnknownMetric(_) => "metrics",
            QueryError::InvalidFilterSyntax(_) | QueryError::InvalidFilterValue { .. } => {
                "metric_filters"
            }
            QueryError::InvalidFormat(_) => "format",
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidCountryCode(_) => "INVALID_COUNTRY_CODE",
            QueryError::InvalidMonthFormat(_) => "INVALID_MONTH_FORMAT",
            QueryError::InvalidRangeFormat(_) => "INVALID_RANGE_FORMAT",
            QueryError::InvalidRangeOrder { .. } => "INVALID_RANGE_ORDER",
            QueryError::UnknownMetric(_) => "UNKNOWN_METRIC",
            QueryError::InvalidFilterSyntax(_) => "INVALID_FILTER_SYNTAX",
            QueryError::InvalidFilterValue { .. } => "INVALID_FILTER_VALUE",
            QueryError::InvalidFormat(_) => "INVALID_FORMAT",
        }
    }
}

/// Invariant violation while building a forecast record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("grid_id must be a positive integer, got {0}")]
    InvalidGridId(i64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("invalid country_id '{0}', expected 3 digits")]
    InvalidCountryId(String),

    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("{metric} must be a finite number, got {value}")]
    NonFiniteMetric { metric: MetricName, value: f64 },

    #[error("{metric} must be >= 0, got {value}")]
    NegativeMetric { metric: MetricName, value: f64 },

    #[error("{metric} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { metric: MetricName, value: f64 },

    #[error("{high} ({high_value}) must be >= {low} ({low_value})")]
    InvertedInterval {
        low: MetricName,
        high: MetricName,
        low_value: f64,
        high_value: f64,
    },

    #[error("at least one metric value must be provided")]
    NoMetrics,
}

/// Failure turning a batch of raw rows into a snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("row {row}: {source}")]
    InvalidRecord {
        row: usize,
        #[source]
        source: RecordError,
    },

    #[error("duplicate forecast for grid {grid_id} in {month}")]
    DuplicateRecord { grid_id: u64, month: String },
}

/// Server-side failure while evaluating a validated query
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The constraint names a catalog metric the loaded dataset does not carry
    #[error("metric column '{0}' is not present in the dataset schema")]
    MissingMetricColumn(MetricName),

    #[error("projection left grid {grid_id} in {month} without any metric values")]
    EmptyProjection { grid_id: u64, month: String },
}
