//! Error types for loading and querying the dataset.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a dataset from the backing source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected data layout: {0}")]
    Layout(String),
}

/// Errors surfaced by query operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The record store has not been loaded successfully.
    #[error("No data available")]
    DataUnavailable,

    #[error("Level {0} not available")]
    InvalidLevel(String),

    #[error("Invalid value for '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Job not found: {0}")]
    NotFound(String),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
