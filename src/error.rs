//! Error types for research requests and response projection.

use thiserror::Error;

/// Errors raised while talking to the research API or reading its responses.
///
/// None of these reach a caller of [`submit`](crate::engine::ConversationEngine::submit):
/// the engine folds every variant into an error turn. They surface directly
/// only from the lower-level client and projection APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connect, TLS, body read).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The research API answered with a non-success status.
    #[error("API request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed as JSON but did not have the expected fields.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// Invalid URL in configuration.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Text shown in the error turn that replaces a failed response.
    pub fn user_message(&self) -> String {
        format!("Error: {self}. Please try again.")
    }
}

/// Result type alias for research operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_names_the_code() {
        let err = Error::Status { status: 500 };
        assert_eq!(err.to_string(), "API request failed with status 500");
    }

    #[test]
    fn user_message_wraps_display_text() {
        let err = Error::Status { status: 503 };
        assert_eq!(
            err.user_message(),
            "Error: API request failed with status 503. Please try again."
        );
    }

    #[test]
    fn shape_error_is_prefixed() {
        let err = Error::Shape("missing field `legal_info`".into());
        assert!(err.to_string().starts_with("unexpected response shape"));
    }
}
