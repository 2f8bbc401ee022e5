//! API error types and handling

use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when talking to the generation API
///
/// Every failure mode of a content call is one of these variants; the client
/// never swallows an error. Callers that present errors to a user should
/// treat `MalformedResponse` as an API-contract problem rather than
/// something the user can act on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure or timeout before a usable response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a status outside the operation's contract
    #[error("Response failed with {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The body did not decode to the canonical texts shape
    #[error("Invalid response body: {0}")]
    MalformedResponse(String),

    /// The HTTP client could not be constructed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ApiError::Transport(format!("Connection failed: {}", err))
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
