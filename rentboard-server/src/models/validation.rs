//! Validation error types

use std::fmt;

/// Validation error for submitted forms and payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field is empty after trimming
    Empty { field: &'static str },

    /// Required form fields missing as a group (listing submission)
    MissingRequired { fields: Vec<&'static str> },

    /// Field doesn't parse as an integer
    NotAnInteger { field: &'static str, value: String },

    /// Uploaded file extension outside the allowed set
    DisallowedFileType { field: &'static str, file_name: String },

    /// String doesn't match required format
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} is required", field),
            Self::MissingRequired { fields } => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            Self::NotAnInteger { field, value } => {
                write!(f, "{} must be an integer (got '{}')", field, value)
            }
            Self::DisallowedFileType { field, file_name } => {
                write!(f, "Invalid file type for {}: '{}'", field, file_name)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}
