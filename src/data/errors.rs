use thiserror::Error;

/// Error types for data-source operations
///
/// Per-source failures are isolated by the fetchers (logged and skipped);
/// none of these variants is fatal to an analysis cycle.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("API error: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Feed error for {feed_source}: {message}")]
    Feed { feed_source: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("No data available for {subject}")]
    NoData { subject: String },

    #[error("Data validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Create a parse error with context
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        DataError::Parse {
            message: message.into(),
        }
    }

    /// Create a feed error tagged with its source URL
    pub fn feed_error<S: Into<String>>(source: S, message: S) -> Self {
        DataError::Feed {
            feed_source: source.into(),
            message: message.into(),
        }
    }

    /// Create a validation error with field context
    pub fn validation_error<S: Into<String>>(field: S, message: S) -> Self {
        DataError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an API error with status code
    pub fn api_error<S: Into<String>>(status_code: u16, message: S) -> Self {
        DataError::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Create a no-data error for a symbol or source
    pub fn no_data<S: Into<String>>(subject: S) -> Self {
        DataError::NoData {
            subject: subject.into(),
        }
    }
}
