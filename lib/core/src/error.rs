use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing feature '{field}' for item {index}")]
    MissingField { index: usize, field: String },

    #[error("Feature '{field}' for item {index} is not numeric")]
    NonNumericField { index: usize, field: String },

    #[error("Non-finite value for feature '{field}' on item {index}")]
    NonFinite { index: usize, field: String },

    #[error("Item count {items} does not match feature record count {records}")]
    CardinalityMismatch { items: usize, records: usize },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Depot index {depot} is out of range for {len} items")]
    InvalidDepot { depot: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Malformed, missing or non-finite input data.
    ///
    /// These abort the current shuffle and are surfaced to the caller untouched.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField { .. }
                | Error::NonNumericField { .. }
                | Error::NonFinite { .. }
                | Error::CardinalityMismatch { .. }
                | Error::InvalidDimension { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
