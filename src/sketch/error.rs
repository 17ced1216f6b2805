use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistinctError>;

#[derive(Error, Debug, PartialEq)]
pub enum DistinctError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Index out of bounds: {index} >= {capacity}")]
    IndexOutOfBounds { index: usize, capacity: usize },

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Expected {expected} label values, got {got}")]
    LabelCardinality { expected: usize, got: usize },

    #[error("Counter has label names; use with_label_values() to observe")]
    MissingLabels,

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// Conversion from String to DistinctError (for validation errors)
impl From<String> for DistinctError {
    fn from(msg: String) -> Self {
        DistinctError::InvalidConfig(msg)
    }
}

impl From<serde_json::Error> for DistinctError {
    fn from(err: serde_json::Error) -> Self {
        DistinctError::SerializationError(err.to_string())
    }
}
