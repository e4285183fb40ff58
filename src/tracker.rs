//! The two tracker modes: grading a submission and summarizing history.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::assignment::assignment_name;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::grader::Grader;
use crate::grading::{GradingResult, Summary};
use crate::overview::{build_overviews, render_table};
use crate::store::SubmissionRecord;

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub record: SubmissionRecord,
    pub summary: Summary,
    pub report_path: PathBuf,
}

impl SubmitOutcome {
    /// e.g. `fuel — 2/3 ✘ failed`
    pub fn report_line(&self) -> String {
        let verdict = if self.summary.passed {
            "✔ passed"
        } else {
            "✘ failed"
        };
        format!(
            "{} — {}/{} {}",
            self.record.assignment, self.summary.passed_tests, self.summary.total_tests, verdict
        )
    }
}

/// Grades `repo` for `student_id` and records the outcome.
///
/// Nothing is persisted unless the grader output parses as JSON.
#[tracing::instrument(skip(config, grader, repo), fields(repo = %repo.display()))]
pub fn submit(
    config: &TrackerConfig,
    grader: &impl Grader,
    repo: &Path,
    student_id: &str,
    now: NaiveDateTime,
) -> Result<SubmitOutcome> {
    let assignment = assignment_name(repo)
        .ok_or_else(|| TrackerError::AssignmentName(repo.display().to_string()))?;

    let raw = grader.grade(repo)?;
    let (report, result) = GradingResult::parse(&raw)?;

    if let Some(error) = &result.error {
        warn!(%error, "Grader reported an error instead of results");
    }

    let store = config.store();
    let report_path = store.write_result(&report, now)?;

    let summary = result.summarize(config.pass_threshold);
    let record = SubmissionRecord::new(
        now,
        student_id,
        &assignment,
        result.slug.as_deref(),
        &summary,
    );
    store.append(&record)?;

    info!(
        assignment = %assignment,
        passed_tests = summary.passed_tests,
        total_tests = summary.total_tests,
        passed = summary.passed,
        "Submission recorded"
    );

    Ok(SubmitOutcome {
        record,
        summary,
        report_path,
    })
}

/// Latest submission per student and assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    /// `false` when the store has never been written.
    pub found: bool,
    pub entries: Vec<SubmissionRecord>,
}

impl Overview {
    pub fn render(&self) -> String {
        render_table(&self.entries)
    }
}

#[tracing::instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
pub fn summary(config: &TrackerConfig) -> Result<Overview> {
    let overview = match config.store().load()? {
        Some(records) => Overview {
            found: true,
            entries: build_overviews(records),
        },
        None => Overview {
            found: false,
            entries: Vec::new(),
        },
    };
    info!(entries = overview.entries.len(), "Built submission overview");
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct FakeGrader {
        output: String,
        calls: Cell<usize>,
    }

    impl FakeGrader {
        fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                calls: Cell::new(0),
            }
        }
    }

    impl Grader for FakeGrader {
        fn grade(&self, _repo: &Path) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.clone())
        }
    }

    const TWO_OF_THREE: &str =
        r#"{"slug":"cs50/x","results":[{"passed":true},{"passed":false},{"passed":true}]}"#;
    const ALL_PASS: &str = r#"{"slug":"cs50/x","results":[{"passed":true},{"passed":true}]}"#;

    fn config(dir: &TempDir) -> TrackerConfig {
        TrackerConfig {
            data_dir: dir.path().join("data"),
            ..TrackerConfig::default()
        }
    }

    fn at(day: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(10, 0, s)
            .unwrap()
    }

    fn repo() -> &'static Path {
        Path::new("/home/alice/cs50/fuel")
    }

    #[test]
    fn test_submit_records_summary() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let outcome = submit(&config, &FakeGrader::new(TWO_OF_THREE), repo(), "s1", at(1, 0)).unwrap();

        assert_eq!(outcome.record.assignment, "fuel");
        assert_eq!(outcome.record.slug.as_deref(), Some("cs50/x"));
        assert_eq!(outcome.summary.total_tests, 3);
        assert_eq!(outcome.summary.passed_tests, 2);
        assert!(!outcome.summary.passed);
        assert_eq!(outcome.report_line(), "fuel — 2/3 ✘ failed");
        assert!(outcome.report_path.starts_with(dir.path().join("data/json_result")));

        let csv = fs::read_to_string(config.store().submissions_path()).unwrap();
        assert_eq!(
            csv.lines().nth(1),
            Some("2024-03-01 10:00:00,s1,fuel,cs50/x,False,3,2")
        );
    }

    #[test]
    fn test_passing_report_line() {
        let dir = TempDir::new().unwrap();
        let outcome =
            submit(&config(&dir), &FakeGrader::new(ALL_PASS), repo(), "s1", at(1, 0)).unwrap();
        assert_eq!(outcome.report_line(), "fuel — 2/2 ✔ passed");
    }

    #[test]
    fn test_threshold_comes_from_config() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_threshold(60.0).unwrap();

        let outcome = submit(&config, &FakeGrader::new(TWO_OF_THREE), repo(), "s1", at(1, 0)).unwrap();
        assert!(outcome.summary.passed);
    }

    #[test]
    fn test_repeated_submissions_append_rows() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let grader = FakeGrader::new(TWO_OF_THREE);

        for s in 0..3 {
            submit(&config, &grader, repo(), "s1", at(1, s)).unwrap();
        }

        let csv = fs::read_to_string(config.store().submissions_path()).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert_eq!(fs::read_dir(config.store().results_dir()).unwrap().count(), 3);
    }

    #[test]
    fn test_invalid_json_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let err = submit(&config, &FakeGrader::new("not json"), repo(), "s1", at(1, 0)).unwrap_err();

        assert!(matches!(err, TrackerError::InvalidGraderOutput { .. }));
        assert!(!config.store().submissions_path().exists());
        assert!(!config.store().results_dir().exists());
    }

    #[test]
    fn test_short_path_skips_grader() {
        let dir = TempDir::new().unwrap();
        let grader = FakeGrader::new(ALL_PASS);

        let err = submit(&config(&dir), &grader, Path::new("psets/fuel"), "s1", at(1, 0)).unwrap_err();

        assert!(matches!(err, TrackerError::AssignmentName(_)));
        assert_eq!(grader.calls.get(), 0);
    }

    #[test]
    fn test_summary_without_store() {
        let dir = TempDir::new().unwrap();
        let overview = summary(&config(&dir)).unwrap();

        assert!(!overview.found);
        assert!(overview.entries.is_empty());
        assert_eq!(overview.render().lines().count(), 2);
    }

    #[test]
    fn test_summary_reports_latest_attempt() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        submit(&config, &FakeGrader::new(TWO_OF_THREE), repo(), "s1", at(1, 0)).unwrap();
        submit(&config, &FakeGrader::new(ALL_PASS), repo(), "s1", at(2, 0)).unwrap();
        submit(&config, &FakeGrader::new(TWO_OF_THREE), repo(), "s0", at(1, 5)).unwrap();

        let overview = summary(&config).unwrap();

        assert!(overview.found);
        assert_eq!(overview.entries.len(), 2);
        assert_eq!(overview.entries[0].student_id, "s0");
        assert_eq!(overview.entries[1].student_id, "s1");
        assert_eq!(overview.entries[1].timestamp, at(2, 0));
        assert!(overview.entries[1].passed);

        let table = overview.render();
        assert!(table.contains("| s1 "));
        assert!(table.contains("PASS"));
        assert!(table.contains("2024-03-02 10:00:00"));
        assert!(!table.contains("2024-03-01 10:00:00"));
    }
}
