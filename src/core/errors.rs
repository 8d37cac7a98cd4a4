//! Shared error types for the pipeline

use thiserror::Error;

/// Main error type for carescore operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (invalid weights, k out of range, bad config file values)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stage was asked to run on fewer records than it needs
    #[error("{stage}: cohort of {actual} records is smaller than the required {needed}")]
    InsufficientData {
        stage: &'static str,
        needed: usize,
        actual: usize,
    },

    /// A record reached the scorer with a required metric still absent
    #[error("hospital {hospital_id} is missing required field {field}")]
    MissingField {
        hospital_id: String,
        field: &'static str,
    },

    /// Input violated the unique-key contract
    #[error("duplicate hospital_id {0} in input")]
    DuplicateId(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV parse/write errors
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Config file parse errors
    #[error("configuration file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
}

impl Error {
    /// Create an insufficient-data error for a named stage
    pub fn insufficient(stage: &'static str, needed: usize, actual: usize) -> Self {
        Self::InsufficientData {
            stage,
            needed,
            actual,
        }
    }

    /// Create a missing-field error for a record
    pub fn missing_field(hospital_id: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            hospital_id: hospital_id.into(),
            field,
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
