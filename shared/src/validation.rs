//! Parsing and validation of query inputs
//!
//! Country codes, months, month ranges, metric lists and metric filter
//! expressions all pass through here before any filtering work happens.

use crate::error::QueryError;
use crate::models::{ComparisonOperator, MetricConstraint, MetricName};
use crate::types::{MonthRange, YearMonth};

/// Characters that may only appear as part of an operator
const OPERATOR_CHARS: [char; 3] = ['<', '>', '='];

// ============================================================================
// Geographic and temporal filters
// ============================================================================

/// Validate a UN M49 country code: exactly three ASCII digits
pub fn validate_country_code(code: &str) -> Result<(), QueryError> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(QueryError::InvalidCountryCode(code.to_string()))
    }
}

/// Parse a `YYYY-MM` month
pub fn parse_month(value: &str) -> Result<YearMonth, QueryError> {
    let invalid = || QueryError::InvalidMonthFormat(value.to_string());

    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(invalid());
    }
    let (year, month) = (&value[..4], &value[5..]);
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    YearMonth::new(year, month).ok_or_else(invalid)
}

/// Parse a `YYYY-MM:YYYY-MM` inclusive range
pub fn parse_month_range(value: &str) -> Result<MonthRange, QueryError> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 {
        return Err(QueryError::InvalidRangeFormat(value.to_string()));
    }

    let start = parse_month(parts[0])?;
    let end = parse_month(parts[1])?;
    MonthRange::new(start, end)
}

/// Expand a `YYYY-MM:YYYY-MM` range into its ascending list of months
pub fn expand_month_range(value: &str) -> Result<Vec<YearMonth>, QueryError> {
    Ok(parse_month_range(value)?.months())
}

// ============================================================================
// Metric selection and constraints
// ============================================================================

/// Resolve metric names, dropping duplicates while keeping first-seen order
pub fn normalize_metrics<S: AsRef<str>>(names: &[S]) -> Result<Vec<MetricName>, QueryError> {
    let mut unique: Vec<MetricName> = Vec::with_capacity(names.len());
    for name in names {
        let metric: MetricName = name.as_ref().parse()?;
        if !unique.contains(&metric) {
            unique.push(metric);
        }
    }
    Ok(unique)
}

/// Parse a `<metric><op><value>` filter expression
pub fn parse_metric_filter(expression: &str) -> Result<MetricConstraint, QueryError> {
    let syntax_error = || QueryError::InvalidFilterSyntax(expression.to_string());

    let (operator, position) = ComparisonOperator::PARSE_ORDER
        .iter()
        .find_map(|op| expression.find(op.symbol()).map(|pos| (*op, pos)))
        .ok_or_else(syntax_error)?;

    let name = expression[..position].trim();
    let value = expression[position + operator.symbol().len()..].trim();

    if name.is_empty() || value.is_empty() {
        return Err(syntax_error());
    }
    if name.contains(OPERATOR_CHARS) || value.contains(OPERATOR_CHARS) {
        return Err(syntax_error());
    }

    let metric: MetricName = name.parse()?;
    let threshold = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| QueryError::InvalidFilterValue {
            expression: expression.to_string(),
            value: value.to_string(),
        })?;

    Ok(MetricConstraint::new(metric, operator, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Country and month validation
    // ========================================================================

    #[test]
    fn test_validate_country_code_valid() {
        assert!(validate_country_code("800").is_ok());
        assert!(validate_country_code("074").is_ok());
        assert!(validate_country_code("000").is_ok());
    }

    #[test]
    fn test_validate_country_code_invalid() {
        assert!(validate_country_code("UGA").is_err()); // Alpha-3
        assert!(validate_country_code("80").is_err()); // Too short
        assert!(validate_country_code("8000").is_err()); // Too long
        assert!(validate_country_code("8a0").is_err());
        assert!(validate_country_code("").is_err());
        assert!(validate_country_code("٨٠٠").is_err()); // Non-ASCII digits
    }

    #[test]
    fn test_parse_month_valid() {
        let month = parse_month("2024-01").unwrap();
        assert_eq!((month.year(), month.month()), (2024, 1));
        assert_eq!(parse_month("1999-12").unwrap().to_string(), "1999-12");
    }

    #[test]
    fn test_parse_month_invalid() {
        for bad in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "2024-01-01", "abcd-ef", "0000-01", "+202-01"] {
            assert_eq!(
                parse_month(bad),
                Err(QueryError::InvalidMonthFormat(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    // ========================================================================
    // Month ranges
    // ========================================================================

    #[test]
    fn test_expand_month_range() {
        let months: Vec<String> = expand_month_range("2024-01:2024-03")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(months, ["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn test_expand_month_range_across_year_boundary() {
        let months: Vec<String> = expand_month_range("2023-11:2024-02")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(months, ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_expand_single_month_range() {
        let months = expand_month_range("2024-06:2024-06").unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].to_string(), "2024-06");
    }

    #[test]
    fn test_month_range_errors() {
        assert!(matches!(
            parse_month_range("2024-03:2024-01"),
            Err(QueryError::InvalidRangeOrder { .. })
        ));
        assert!(matches!(
            parse_month_range("2024-01-2024-03"),
            Err(QueryError::InvalidRangeFormat(_))
        ));
        assert!(matches!(
            parse_month_range("2024-01:2024-02:2024-03"),
            Err(QueryError::InvalidRangeFormat(_))
        ));
        assert_eq!(
            parse_month_range("2024-01:2024-14"),
            Err(QueryError::InvalidMonthFormat("2024-14".to_string()))
        );
    }

    // ========================================================================
    // Metric lists and filters
    // ========================================================================

    #[test]
    fn test_normalize_metrics_deduplicates_in_order() {
        let metrics = normalize_metrics(&["map", "map", "prob_1"]).unwrap();
        assert_eq!(metrics, vec![MetricName::Map, MetricName::Prob1]);

        let metrics = normalize_metrics(&["prob_1", "map", "prob_1"]).unwrap();
        assert_eq!(metrics, vec![MetricName::Prob1, MetricName::Map]);
    }

    #[test]
    fn test_normalize_metrics_rejects_unknown() {
        assert_eq!(
            normalize_metrics(&["map", "fatalities"]),
            Err(QueryError::UnknownMetric("fatalities".to_string()))
        );
    }

    #[test]
    fn test_parse_metric_filter_two_char_operator() {
        let constraint = parse_metric_filter("map>=50").unwrap();
        assert_eq!(constraint.metric, MetricName::Map);
        assert_eq!(constraint.operator, ComparisonOperator::GreaterOrEqual);
        assert_eq!(constraint.value, 50.0);

        let constraint = parse_metric_filter("prob_10<=0.25").unwrap();
        assert_eq!(constraint.operator, ComparisonOperator::LessOrEqual);
        assert_eq!(constraint.value, 0.25);
    }

    #[test]
    fn test_parse_metric_filter_single_char_operator() {
        let constraint = parse_metric_filter("map>50").unwrap();
        assert_eq!(constraint.operator, ComparisonOperator::GreaterThan);

        let constraint = parse_metric_filter(" ci_90_high < 12.5 ").unwrap();
        assert_eq!(constraint.metric, MetricName::Ci90High);
        assert_eq!(constraint.operator, ComparisonOperator::LessThan);
        assert_eq!(constraint.value, 12.5);
    }

    #[test]
    fn test_parse_metric_filter_syntax_errors() {
        for bad in ["map>>50", "map=50", "map", ">50", "map>", "map<=>5", "map>=5<3", ""] {
            assert!(
                matches!(parse_metric_filter(bad), Err(QueryError::InvalidFilterSyntax(_))),
                "{bad:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn test_parse_metric_filter_unknown_metric() {
        assert_eq!(
            parse_metric_filter("bogus>5"),
            Err(QueryError::UnknownMetric("bogus".to_string()))
        );
    }

    #[test]
    fn test_parse_metric_filter_invalid_value() {
        for bad in ["map>notanumber", "map>inf", "map<NaN", "map>1e999"] {
            assert!(
                matches!(parse_metric_filter(bad), Err(QueryError::InvalidFilterValue { .. })),
                "{bad:?} should be an invalid value"
            );
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Expanded ranges are contiguous, ascending and inclusive
        #[test]
        fn property_month_range_is_contiguous(
            year in 1900i32..2100,
            month in 1u32..=12,
            span in 0usize..60,
        ) {
            let start = YearMonth::new(year, month).unwrap();
            let mut end = start;
            for _ in 0..span {
                end = end.succ().unwrap();
            }
            let months = expand_month_range(&format!("{start}:{end}")).unwrap();

            prop_assert_eq!(months.len(), span + 1);
            prop_assert_eq!(months[0], start);
            prop_assert_eq!(*months.last().unwrap(), end);
            for pair in months.windows(2) {
                prop_assert_eq!(pair[0].succ(), Some(pair[1]));
            }
        }

        /// Swapping the bounds of a multi-month range is always rejected
        #[test]
        fn property_inverted_range_rejected(
            year in 1900i32..2100,
            month in 1u32..=12,
            span in 1usize..60,
        ) {
            let start = YearMonth::new(year, month).unwrap();
            let mut end = start;
            for _ in 0..span {
                end = end.succ().unwrap();
            }
            let is_order_error = matches!(
                parse_month_range(&format!("{end}:{start}")),
                Err(QueryError::InvalidRangeOrder { .. })
            );
            prop_assert!(is_order_error);
        }

        /// Every three-digit string is a valid country code
        #[test]
        fn property_three_digit_codes_valid(code in "[0-9]{3}") {
            prop_assert!(validate_country_code(&code).is_ok());
        }

        /// Anything that is not exactly three digits is rejected
        #[test]
        fn property_other_codes_invalid(code in "[0-9]{0,2}|[0-9]{4,6}|[A-Z]{3}") {
            prop_assert!(validate_country_code(&code).is_err());
        }

        /// Finite thresholds survive parsing unchanged
        #[test]
        fn property_filter_value_round_trip(value in 0.0f64..1.0e6) {
            let constraint = parse_metric_filter(&format!("map>={value}")).unwrap();
            prop_assert_eq!(constraint.value, value);
        }
    }
}
