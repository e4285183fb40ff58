use std::path::PathBuf;

use crate::error::{Result, TrackerError};
use crate::grading::DEFAULT_PASS_THRESHOLD;
use crate::store::Store;

pub const DATA_DIR_VAR: &str = "TRACKER_DATA_DIR";
pub const GRADER_VAR: &str = "TRACKER_GRADER";
pub const THRESHOLD_VAR: &str = "TRACKER_PASS_THRESHOLD";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_GRADER: &str = "check50";

/// Settings for the submission tracker.
///
/// Every path the tracker touches lives under `data_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub grader: String,
    /// Percentage of passing checks required, in `0..=100`.
    pub pass_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            grader: DEFAULT_GRADER.to_string(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl TrackerConfig {
    /// Reads `TRACKER_DATA_DIR`, `TRACKER_GRADER` and
    /// `TRACKER_PASS_THRESHOLD`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(grader) = lookup(GRADER_VAR).filter(|v| !v.is_empty()) {
            config.grader = grader;
        }
        if let Some(raw) = lookup(THRESHOLD_VAR).filter(|v| !v.is_empty()) {
            let threshold = raw.trim().parse::<f64>().map_err(|_| {
                TrackerError::Config(format!("{THRESHOLD_VAR} is not a number: {raw:?}"))
            })?;
            config = config.with_threshold(threshold)?;
        }

        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(TrackerError::Config(format!(
                "pass threshold must be between 0 and 100, got {threshold}"
            )));
        }
        self.pass_threshold = threshold;
        Ok(self)
    }

    pub fn store(&self) -> Store {
        Store::new(&self.data_dir)
    }
}
