//! CLI entry point for the submission tracker.
//!
//! `submit <ASSIGNMENT_REPO> <STUDENT_ID>` grades a repository and records
//! the result; `submit -sum` prints the latest submission per student and
//! assignment.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use coursework_tracker::config::TrackerConfig;
use coursework_tracker::error::TrackerError;
use coursework_tracker::grader::Check50;
use coursework_tracker::{telemetry, tracker};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, warn};

#[derive(Parser)]
#[command(name = "submit")]
#[command(about = "Grade an assignment with check50 and track submissions", long_about = None)]
struct Cli {
    /// Show the latest submission per student and assignment (also `-sum`)
    #[arg(long = "sum", conflicts_with_all = ["repo", "student_id"])]
    sum: bool,

    /// Path to the assignment repository, e.g. ~/cs50/psets/fuel
    #[arg(value_name = "ASSIGNMENT_REPO", required_unless_present = "sum")]
    repo: Option<PathBuf>,

    /// Student identifier recorded with the submission
    #[arg(value_name = "STUDENT_ID", required_unless_present = "sum")]
    student_id: Option<String>,

    /// Anything after STUDENT_ID is accepted and ignored
    #[arg(value_name = "IGNORED", hide = true)]
    ignored: Vec<String>,

    /// Directory holding submission.csv and json_result/ [env: TRACKER_DATA_DIR]
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Grader program to run [env: TRACKER_GRADER]
    #[arg(long, value_name = "PROGRAM")]
    grader: Option<String>,

    /// Percentage of passing checks needed to pass [env: TRACKER_PASS_THRESHOLD]
    #[arg(long, value_name = "PERCENT")]
    threshold: Option<f64>,
}

/// Accepts the historical single-dash `-sum` spelling.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| if arg == "-sum" { OsString::from("--sum") } else { arg })
        .collect()
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = telemetry::init("submit", LevelFilter::INFO);

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let config = load_config(&cli)?;
    debug!(?config, "Configuration loaded");

    if cli.sum {
        let overview = tracker::summary(&config)?;
        if !overview.found {
            println!("No submission found!");
        }
        println!("{}", overview.render());
        return Ok(ExitCode::SUCCESS);
    }

    // clap requires both positionals whenever --sum is absent
    let (Some(repo), Some(student_id)) = (cli.repo, cli.student_id) else {
        unreachable!("ASSIGNMENT_REPO and STUDENT_ID are required without --sum");
    };
    if !cli.ignored.is_empty() {
        warn!(ignored = ?cli.ignored, "Ignoring extra arguments");
    }

    let grader = Check50::new(config.grader.clone());
    let now = chrono::Local::now().naive_local();

    match tracker::submit(&config, &grader, &repo, &student_id, now) {
        Ok(outcome) => {
            println!("{}", outcome.report_line());
            Ok(ExitCode::SUCCESS)
        }
        Err(TrackerError::InvalidGraderOutput { raw, source }) => {
            error!(error = %source, "Grader output is not JSON");
            println!("{} did not return valid JSON", grader.program());
            println!("{raw}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("submission of {} failed", repo.display())),
    }
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = TrackerConfig::from_env().context("reading tracker configuration")?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(grader) = &cli.grader {
        config.grader = grader.clone();
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold)?;
    }
    Ok(config)
}
