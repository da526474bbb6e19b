use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the LinkedIn insights pipeline.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document is structurally broken (bad quoting, unreadable row).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A column the pipeline depends on is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A `Connected On` value did not match any recognised date format.
    #[error("Invalid connection date {value:?} on row {row}")]
    MalformedDate { row: usize, value: String },

    /// A message `DATE` value did not match `YYYY-MM-DD HH:MM:SS UTC`.
    #[error("Invalid message timestamp {value:?} on row {row}")]
    MalformedTimestamp { row: usize, value: String },

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// An expected file is absent from the export directory.
    #[error("{name} not found in {dir}")]
    ExportFileNotFound { name: String, dir: PathBuf },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;
