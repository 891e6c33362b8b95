//! Handler errors and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures surfaced to the browser as JSON error bodies.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no login session: visit /login first")]
    NoSession,

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Auth(#[from] linkedin_auth::Error),

    #[error(transparent)]
    Api(#[from] linkedin_api::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        use linkedin_api::Error as ApiError;
        use linkedin_auth::Error as AuthError;

        match self {
            Error::NoSession | Error::Auth(AuthError::Login(_)) => StatusCode::BAD_REQUEST,
            Error::NotLoggedIn | Error::Api(ApiError::MissingToken) => StatusCode::UNAUTHORIZED,
            Error::Auth(AuthError::Configuration(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Api(ApiError::InvalidRequest(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Auth(AuthError::Transport(_)) | Error::Api(ApiError::Transport(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            Error::Auth(AuthError::TokenExchange(_))
            | Error::Api(ApiError::Api { .. })
            | Error::Api(ApiError::InvalidResponse(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for the `login_failed_total` metric.
    pub fn reason(&self) -> &'static str {
        use linkedin_auth::Error as AuthError;

        match self {
            Error::NoSession => "no_session",
            Error::NotLoggedIn => "not_logged_in",
            Error::Auth(AuthError::Login(m)) if m.contains("csrf") => "csrf",
            Error::Auth(AuthError::Login(m)) if m.starts_with("authorization denied") => "denied",
            Error::Auth(AuthError::Login(_)) => "bad_callback",
            Error::Auth(AuthError::TokenExchange(_)) => "token_exchange",
            Error::Auth(AuthError::Configuration(_)) => "configuration",
            Error::Auth(AuthError::Transport(_)) | Error::Api(linkedin_api::Error::Transport(_)) => {
                "transport"
            }
            Error::Api(_) => "api",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = serde_json::json!({
            "error": self.reason(),
            "message": self.to_string(),
        });
        if let Error::Api(linkedin_api::Error::Api { code, .. }) = &self {
            body["error_code"] = serde_json::json!(code);
        }
        (status, axum::Json(body)).into_response()
    }
}

/// Result alias for handlers
pub type Result<T> = std::result::Result<T, Error>;
