use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionSheetError {
    #[error("Validation error for ledger line '{line}': {details}")]
    ValidationError { line: String, details: String },

    #[error("No ledger lines provided for company: {0}")]
    EmptyInput(String),

    #[error("Invalid master-data hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown disclosure note: {0}")]
    UnknownNote(String),

    #[error("Disclosure note {0} is inactive and cannot be overridden")]
    InactiveNote(String),

    #[error("License expired on {expired_on}")]
    LicenseExpired { expired_on: NaiveDate },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SelectionSheetError>;
