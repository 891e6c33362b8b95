//! Error types for the login flow

use transport::TransportError;

/// Errors from configuration, login and token exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required setup is missing (client id/secret, callback URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Callback was missing code/state, the user denied access, or the CSRF
    /// state did not match.
    #[error("login failed: {0}")]
    Login(String),

    /// Provider rejected the code or returned a malformed body.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
