//! Invocation of the external grading tool.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, TrackerError};

/// Runs checks against an assignment repository and returns the raw report.
pub trait Grader {
    fn grade(&self, repo: &Path) -> Result<String>;
}

/// `check50`-compatible grader: `<program> --local <repo> -o json`.
pub struct Check50 {
    program: String,
}

impl Check50 {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Grader for Check50 {
    /// Only stdout is used. The exit status is logged and otherwise ignored.
    #[tracing::instrument(skip(self, repo), fields(program = %self.program, repo = %repo.display()))]
    fn grade(&self, repo: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--local")
            .arg(repo)
            .args(["-o", "json"])
            .output()
            .map_err(|source| TrackerError::GraderSpawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            debug!(bytes = output.stdout.len(), "Grader finished");
        } else {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Grader exited unsuccessfully"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
