pub mod assignment;
pub mod config;
pub mod error;
pub mod gauge;
pub mod grader;
pub mod grading;
pub mod overview;
pub mod store;
pub mod telemetry;
pub mod tracker;
