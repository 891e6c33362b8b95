//! Application credentials and endpoint configuration

use common::Secret;

use crate::constants::{API_BASE, AUTHORIZE_ENDPOINT, TOKEN_ENDPOINT};
use crate::error::{Error, Result};
use crate::token::AccessToken;

/// Endpoint URLs. Defaults to production LinkedIn; tests and staging point
/// these at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize: String,
    pub token: String,
    pub api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authorize: AUTHORIZE_ENDPOINT.to_owned(),
            token: TOKEN_ENDPOINT.to_owned(),
            api_base: API_BASE.to_owned(),
        }
    }
}

impl Endpoints {
    /// All endpoints under one base URL, using LinkedIn's path layout.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize: format!("{base}/uas/oauth2/authorization"),
            token: format!("{base}/uas/oauth2/accessToken"),
            api_base: format!("{base}/v1"),
        }
    }
}

/// LinkedIn application settings. Immutable once built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    client_id: String,
    client_secret: Secret<String>,
    callback_url: Option<String>,
    access_token: Option<AccessToken>,
    endpoints: Endpoints,
}

impl ClientConfig {
    /// Client id and secret are required and must be non-empty.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret<String>>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(Error::Configuration("client id (client_id) not provided".into()));
        }
        if client_secret.is_blank() {
            return Err(Error::Configuration(
                "client secret (client_secret) not provided".into(),
            ));
        }

        Ok(Self {
            client_id,
            client_secret,
            callback_url: None,
            access_token: None,
            endpoints: Endpoints::default(),
        })
    }

    /// URL LinkedIn redirects back to. An empty string leaves it unset.
    pub fn with_callback(mut self, callback_url: impl Into<String>) -> Self {
        let callback_url = callback_url.into();
        self.callback_url = (!callback_url.trim().is_empty()).then_some(callback_url);
        self
    }

    /// Start with a token obtained in an earlier login.
    pub fn with_access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &Secret<String> {
        &self.client_secret
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    /// The callback URL, or a configuration error when unset.
    pub fn require_callback(&self) -> Result<&str> {
        self.callback_url()
            .ok_or_else(|| Error::Configuration("callback URL (callback_url) not set".into()))
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_client_id_and_secret() {
        let err = ClientConfig::new("", "secret").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("client_id")));

        let err = ClientConfig::new("id", "  ").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("client_secret")));
    }

    #[test]
    fn empty_callback_is_absent() {
        let config = ClientConfig::new("id", "secret").unwrap().with_callback("");
        assert!(config.callback_url().is_none());
        assert!(matches!(
            config.require_callback(),
            Err(Error::Configuration(_))
        ));

        let config = config.with_callback("https://app.example.com/callback");
        assert_eq!(
            config.require_callback().unwrap(),
            "https://app.example.com/callback"
        );
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let config = ClientConfig::new("id", "very-secret-value").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret-value"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_endpoints_are_production() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.authorize,
            "https://www.linkedin.com/uas/oauth2/authorization"
        );
        assert_eq!(
            endpoints.token,
            "https://www.linkedin.com/uas/oauth2/accessToken"
        );
        assert_eq!(endpoints.api_base, "https://api.linkedin.com/v1");
    }

    #[test]
    fn endpoints_with_base_keep_path_layout() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:8080/");
        assert_eq!(
            endpoints.authorize,
            "http://127.0.0.1:8080/uas/oauth2/authorization"
        );
        assert_eq!(endpoints.token, "http://127.0.0.1:8080/uas/oauth2/accessToken");
        assert_eq!(endpoints.api_base, "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn preexisting_token_is_kept() {
        let token = AccessToken::new("abc123").unwrap();
        let config = ClientConfig::new("id", "secret")
            .unwrap()
            .with_access_token(token.clone());
        assert_eq!(config.access_token(), Some(&token));
    }
}
