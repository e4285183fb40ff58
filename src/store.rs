//! Persistence for submissions: the append-only CSV history and the raw
//! grader reports.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/submission.csv
//! <root>/json_result/student_result_<YYYYMMDD_HHMMSS>.json
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::grading::Summary;

pub const SUBMISSIONS_FILE: &str = "submission.csv";
pub const RESULTS_DIR: &str = "json_result";

/// One row of `submission.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub student_id: String,
    pub assignment: String,
    pub slug: Option<String>,
    #[serde(with = "python_bool")]
    pub passed: bool,
    pub total_tests: usize,
    pub passed_tests: usize,
}

impl SubmissionRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        student_id: &str,
        assignment: &str,
        slug: Option<&str>,
        summary: &Summary,
    ) -> Self {
        SubmissionRecord {
            timestamp,
            student_id: student_id.to_string(),
            assignment: assignment.to_string(),
            slug: slug.map(str::to_string),
            passed: summary.passed,
            total_tests: summary.total_tests,
            passed_tests: summary.passed_tests,
        }
    }
}

/// File-backed submission store.
///
/// Appends are not atomic and nothing is locked: only one `submit` process
/// may write to a given root at a time.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn submissions_path(&self) -> PathBuf {
        self.root.join(SUBMISSIONS_FILE)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(RESULTS_DIR)
    }

    /// Appends `record` to the CSV history.
    ///
    /// Creates the file with headers if it does not already exist.
    pub fn append(&self, record: &SubmissionRecord) -> Result<()> {
        let path = self.submissions_path();
        fs::create_dir_all(&self.root).map_err(TrackerError::io(&self.root))?;

        let file_exists = path.exists();
        debug!(path = %path.display(), file_exists, "Appending CSV record");

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(TrackerError::io(&path))?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        writer.serialize(record)?;
        writer.flush().map_err(TrackerError::io(&path))?;

        Ok(())
    }

    /// Reads every record in file order. `None` when nothing was ever
    /// submitted.
    pub fn load(&self) -> Result<Option<Vec<SubmissionRecord>>> {
        let path = self.submissions_path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TrackerError::io(&path)(e)),
        };

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<SubmissionRecord>, _>>()?;

        debug!(path = %path.display(), count = records.len(), "Loaded submissions");
        Ok(Some(records))
    }

    /// Writes the grader report verbatim to a file named after `at`.
    ///
    /// A report written in the same second as an earlier one gets a numeric
    /// suffix rather than replacing it.
    pub fn write_result(&self, report: &Value, at: NaiveDateTime) -> Result<PathBuf> {
        let dir = self.results_dir();
        fs::create_dir_all(&dir).map_err(TrackerError::io(&dir))?;

        let stamp = at.format("%Y%m%d_%H%M%S").to_string();
        let mut attempt = 0u32;
        let (path, file) = loop {
            let name = match attempt {
                0 => format!("student_result_{stamp}.json"),
                n => format!("student_result_{stamp}_{n}.json"),
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(TrackerError::io(&path)(e)),
            }
        };

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush().map_err(TrackerError::io(&path))?;

        info!(path = %path.display(), "Saved grader report");
        Ok(path)
    }
}

/// `YYYY-MM-DD HH:MM:SS`, which also sorts lexicographically.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Booleans are stored as `True` / `False`.
mod python_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.as_str() {
            "True" | "true" => Ok(true),
            "False" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected True or False, got {other:?}"
            ))),
        }
    }
}
