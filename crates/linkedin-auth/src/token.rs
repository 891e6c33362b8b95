//! Access tokens and the authorization code exchange
//!
//! The exchange POSTs the code to the token endpoint with the
//! `authorization_code` grant. The provider's answer is judged by its JSON
//! content: an `error` field or a missing `access_token` is a failure,
//! whatever the HTTP status.

use std::fmt;

use common::Secret;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use transport::header::CONTENT_TYPE;
use transport::{HttpRequest, Transport};
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::constants::FORM_CONTENT_TYPE;
use crate::error::{Error, Result};

/// Bearer token for the LinkedIn API. Redacted in Debug output.
#[derive(Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    /// Wrap a token string; empty strings are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::Configuration("access token must not be empty".into()));
        }
        Ok(Self(Secret::new(value)))
    }

    /// The raw token, for building the Authorization header.
    pub fn secret(&self) -> &str {
        self.0.expose()
    }

    /// `Bearer <token>` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.secret()
            .as_bytes()
            .ct_eq(other.secret().as_bytes())
            .into()
    }
}

impl Eq for AccessToken {}

/// Body returned by the token endpoint, success or failure.
///
/// `expires_in` is seconds from the response time. It is decoded for
/// logging only; tokens are never refreshed.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Decode a raw token endpoint body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
    }

    /// The access token, or the provider's reason for withholding it.
    pub fn into_token(self) -> Result<AccessToken> {
        if let Some(error) = self.error {
            let reason = match self.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(Error::TokenExchange(reason));
        }

        match self.access_token {
            Some(token) if !token.trim().is_empty() => AccessToken::new(token),
            _ => Err(Error::TokenExchange(
                "response did not contain access_token".into(),
            )),
        }
    }
}

/// Form body for the authorization code grant.
fn exchange_form(config: &ClientConfig, redirect_uri: &str, code: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "authorization_code")
        .append_pair("code", code)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("client_id", config.client_id())
        .append_pair("client_secret", config.client_secret().expose())
        .finish()
}

/// Exchange an authorization code for an access token.
///
/// Does not touch any client state; `AuthClient::exchange_code` stores the
/// result on success.
pub async fn exchange_code(
    transport: &dyn Transport,
    config: &ClientConfig,
    code: &str,
) -> Result<AccessToken> {
    let redirect_uri = config.require_callback()?;
    let token_url = &config.endpoints().token;

    let request = HttpRequest::post(token_url.as_str())
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)?
        .body(exchange_form(config, redirect_uri, code));

    debug!(transport = transport.id(), url = %token_url, "exchanging authorization code");
    let response = transport.send(request).await?;

    let token = TokenResponse::parse(&response.body)
        .and_then(|parsed| {
            if let Some(expires_in) = parsed.expires_in {
                debug!(expires_in, "token endpoint reported lifetime");
            }
            parsed.into_token()
        })
        .inspect_err(|e| warn!(status = response.status, error = %e, "token exchange rejected"))?;

    info!("authorization code exchanged for access token");
    Ok(token)
}
