//! Error types for nj-retention operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RetentionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_timezone_display() {
        let err = RetentionError::InvalidTimezone("'Mars/Olympus'".to_string());
        assert_eq!(err.to_string(), "Invalid timezone: 'Mars/Olympus'");
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: RetentionError = json_err.into();
        assert!(matches!(err, RetentionError::Json(_)));
        assert!(err.to_string().contains("parse settings JSON"));
    }
}
