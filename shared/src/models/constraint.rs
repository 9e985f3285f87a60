//! Metric value constraints such as `map>50`

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::QueryError;
use crate::models::{ForecastMetrics, MetricName};
use crate::validation;

/// Comparison operator of a metric constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl ComparisonOperator {
    /// Two-character symbols come first so `>=` never parses as `>`
    pub const PARSE_ORDER: [ComparisonOperator; 4] = [
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::LessThan,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessOrEqual => "<=",
        }
    }

    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThan => lhs > rhs,
            ComparisonOperator::GreaterOrEqual => lhs >= rhs,
            ComparisonOperator::LessThan => lhs < rhs,
            ComparisonOperator::LessOrEqual => lhs <= rhs,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single predicate over one metric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricConstraint {
    pub metric: MetricName,
    pub operator: ComparisonOperator,
    pub value: f64,
}

impl MetricConstraint {
    pub fn new(metric: MetricName, operator: ComparisonOperator, value: f64) -> Self {
        Self {
            metric,
            operator,
            value,
        }
    }

    /// Whether the row satisfies the constraint. Absent values never match.
    pub fn matches(&self, metrics: &ForecastMetrics) -> bool {
        metrics
            .get(self.metric)
            .is_some_and(|actual| self.operator.evaluate(actual, self.value))
    }
}

impl fmt::Display for MetricConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.metric, self.operator, self.value)
    }
}

impl FromStr for MetricConstraint {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::parse_metric_filter(s)
    }
}

impl Serialize for MetricConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_evaluation() {
        assert!(ComparisonOperator::GreaterThan.evaluate(60.0, 50.0));
        assert!(!ComparisonOperator::GreaterThan.evaluate(50.0, 50.0));
        assert!(ComparisonOperator::GreaterOrEqual.evaluate(50.0, 50.0));
        assert!(ComparisonOperator::LessThan.evaluate(40.0, 50.0));
        assert!(!ComparisonOperator::LessThan.evaluate(50.0, 50.0));
        assert!(ComparisonOperator::LessOrEqual.evaluate(50.0, 50.0));
    }

    #[test]
    fn test_absent_metric_never_matches() {
        let metrics = ForecastMetrics::try_new([(MetricName::Prob1, 0.5)]).unwrap();
        let constraint = MetricConstraint::new(MetricName::Map, ComparisonOperator::LessThan, 1e9);
        assert!(!constraint.matches(&metrics));
    }

    #[test]
    fn test_display_renders_expression() {
        let constraint =
            MetricConstraint::new(MetricName::Prob1000, ComparisonOperator::GreaterOrEqual, 0.1);
        assert_eq!(constraint.to_string(), "prob_1000>=0.1");
        assert_eq!(
            serde_json::to_string(&constraint).unwrap(),
            "\"prob_1000>=0.1\""
        );
    }
}
