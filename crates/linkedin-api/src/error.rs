//! Error types for API requests

use transport::TransportError;

/// Errors from an API request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request was attempted before any access token was set.
    #[error("access token missing: log in or set a token before making requests")]
    MissingToken,

    /// LinkedIn answered with an `errorCode` body.
    #[error("LinkedIn API error {code}: {message}")]
    Api {
        message: String,
        code: i64,
        /// HTTP status echoed in the error body, when present
        status: Option<u16>,
        request_id: Option<String>,
    },

    /// Body was not JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad resource path, bad method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
