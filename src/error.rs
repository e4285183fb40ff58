//! Error types for the gauge and the submission tracker.

use std::path::PathBuf;
use thiserror::Error;

/// Why a line of gauge input was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GaugeError {
    #[error("expected `numerator/denominator`, got {0:?}")]
    Format(String),
    #[error("not an integer: {0:?}")]
    Parse(String),
    #[error("fraction must not be negative")]
    Negative,
    #[error("numerator is larger than the denominator")]
    Improper,
    #[error("denominator is zero")]
    ZeroDenominator,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("cannot derive an assignment name from {0:?} (expected at least four path components)")]
    AssignmentName(String),

    #[error("failed to run grader `{program}`")]
    GraderSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The grader printed something that is not JSON. `raw` holds its stdout.
    #[error("grader did not return valid JSON: {source}")]
    InvalidGraderOutput {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid grading result: {0}")]
    GradingResult(#[source] serde_json::Error),

    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TrackerError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TrackerError::Io { path, source }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
