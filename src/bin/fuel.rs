//! Fuel gauge: reads `numerator/denominator` until valid and prints `E`,
//! `F` or the percentage.

use std::io;

use anyhow::Result;
use coursework_tracker::gauge::read_reading;
use coursework_tracker::telemetry;
use tracing::level_filters::LevelFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let _log_guard = telemetry::init("fuel", LevelFilter::WARN);

    let reading = read_reading(io::stdin().lock(), io::stdout())?;
    println!("{reading}");

    Ok(())
}
