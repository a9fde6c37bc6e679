use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Field '{field}' not found in schema ({operation})")]
    MissingField { field: String, operation: String },

    #[error("Field '{field}' already exists in schema ({operation})")]
    DuplicateField { field: String, operation: String },

    #[error("Schema mismatch in {location}: expected [{expected}], found [{found}]")]
    SchemaMismatch {
        location: String,
        expected: String,
        found: String,
    },

    #[error("Storage error at {location}: {message}")]
    Storage { location: String, message: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn missing_field(field: &str, operation: &str) -> Self {
        ProcessingError::MissingField {
            field: field.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn storage(location: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        ProcessingError::Storage {
            location: location.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
