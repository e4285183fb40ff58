//! Structured view of a grader report and the pass/fail summary derived
//! from it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TrackerError};

/// Default share of passing checks, in percent, for a submission to pass.
pub const DEFAULT_PASS_THRESHOLD: f64 = 70.0;

/// One check from the grader report. Skipped checks carry `passed: null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestOutcome {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub passed: Option<bool>,
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        self.passed == Some(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradingResult {
    #[serde(default)]
    pub slug: Option<String>,
    /// `null` when the grader could not run the checks at all.
    #[serde(default)]
    results: Option<Vec<TestOutcome>>,
    /// Set by the grader when it failed before running any check.
    #[serde(default)]
    pub error: Option<Value>,
}

impl GradingResult {
    /// Parses raw grader stdout, keeping the untouched JSON value alongside.
    pub fn parse(raw: &str) -> Result<(Value, GradingResult)> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| TrackerError::InvalidGraderOutput {
                raw: raw.to_string(),
                source,
            })?;
        let result = GradingResult::from_value(&value)?;
        Ok((value, result))
    }

    pub fn from_value(value: &Value) -> Result<GradingResult> {
        GradingResult::deserialize(value).map_err(TrackerError::GradingResult)
    }

    pub fn results(&self) -> &[TestOutcome] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn summarize(&self, pass_threshold: f64) -> Summary {
        let total_tests = self.results().len();
        let passed_tests = self.results().iter().filter(|r| r.is_passed()).count();
        Summary {
            total_tests,
            passed_tests,
            passed: Summary::meets_threshold(passed_tests, total_tests, pass_threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub passed: bool,
}

impl Summary {
    /// An empty report never passes.
    pub fn meets_threshold(passed: usize, total: usize, pass_threshold: f64) -> bool {
        if total == 0 {
            return false;
        }
        (passed as f64 / total as f64) * 100.0 >= pass_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_of_three_fails_at_seventy() {
        let raw = r#"{"slug":"cs50/x","results":[{"passed":true},{"passed":false},{"passed":true}]}"#;
        let (_, result) = GradingResult::parse(raw).unwrap();

        assert_eq!(result.slug.as_deref(), Some("cs50/x"));
        assert_eq!(
            result.summarize(DEFAULT_PASS_THRESHOLD),
            Summary {
                total_tests: 3,
                passed_tests: 2,
                passed: false,
            }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(Summary::meets_threshold(7, 10, 70.0));
        assert!(!Summary::meets_threshold(6, 10, 70.0));
        assert!(Summary::meets_threshold(3, 3, 100.0));
        assert!(Summary::meets_threshold(0, 3, 0.0));
    }

    #[test]
    fn test_empty_results_do_not_pass() {
        let (_, result) = GradingResult::parse(r#"{"slug":"cs50/x","results":[]}"#).unwrap();
        assert_eq!(
            result.summarize(0.0),
            Summary {
                total_tests: 0,
                passed_tests: 0,
                passed: false,
            }
        );
    }

    #[test]
    fn test_grader_error_report() {
        let raw = r#"{"slug":"cs50/x","error":{"type":"InvalidSlugError","value":"bad"},"results":null}"#;
        let (_, result) = GradingResult::parse(raw).unwrap();

        assert!(result.error.is_some());
        assert!(result.results().is_empty());
    }

    #[test]
    fn test_skipped_checks_are_not_passed() {
        let raw = r#"{"slug":"cs50/x","results":[
            {"name":"exists","description":"fuel.py exists","passed":true},
            {"name":"compiles","passed":null},
            {"name":"runs"}
        ]}"#;
        let (_, result) = GradingResult::parse(raw).unwrap();
        let summary = result.summarize(DEFAULT_PASS_THRESHOLD);

        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed_tests, 1);
        assert_eq!(result.results()[0].name.as_deref(), Some("exists"));
    }

    #[test]
    fn test_missing_slug_and_results() {
        let (value, result) = GradingResult::parse("{}").unwrap();
        assert_eq!(value, serde_json::json!({}));
        assert_eq!(result.slug, None);
        assert!(result.results().is_empty());
    }

    #[test]
    fn test_invalid_json_keeps_raw_output() {
        let err = GradingResult::parse("Traceback: boom").unwrap_err();
        match err {
            TrackerError::InvalidGraderOutput { raw, .. } => assert_eq!(raw, "Traceback: boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unexpected_shape_is_rejected() {
        let err = GradingResult::parse(r#"{"results": 5}"#).unwrap_err();
        assert!(matches!(err, TrackerError::GradingResult(_)));
    }
}
