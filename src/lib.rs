pub mod aggregate;
pub mod catalog;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod models;
pub mod report;
pub mod schema;
pub mod store;

/// Raw dataset files tried after the cleaned cache, in order.
pub const DEFAULT_DATA_PATHS: &[&str] = &["Netflix Dataset.csv", "netflix_titles.csv"];

/// Cleaned table persisted by the pipeline and preferred on the next load.
pub const DEFAULT_CLEANED_PATH: &str = "outputs/cleaned_netflix.csv";

pub const DEFAULT_REPORT_PATH: &str = "outputs/netflix_report.html";

/// Application name for XDG paths
pub const APP_NAME: &str = "flixlens";
