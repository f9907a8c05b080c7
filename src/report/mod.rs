//! Dataset summary reports.

pub mod generator;

pub use generator::{build_summary, generate_json_report, generate_markdown_report};
