//! Authorization-code login client
//!
//! Holds the application config, a shared transport and, once login has
//! completed, the user's access token. One client per user session: the
//! token field is not shared between logins.

use std::sync::Arc;

use tracing::{debug, info, warn};
use transport::{ReqwestTransport, Transport};
use url::Url;

use crate::callback::CallbackParams;
use crate::config::ClientConfig;
use crate::constants::STATE_SESSION_KEY;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::state::{generate_state, verify_state};
use crate::token::{self, AccessToken};

pub struct AuthClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    access_token: Option<AccessToken>,
}

impl AuthClient {
    /// Client over the default reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let access_token = config.access_token().cloned();
        Self {
            config,
            transport,
            access_token,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Transport shared with API clients built from this one.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn set_access_token(&mut self, token: AccessToken) {
        self.access_token = Some(token);
    }

    pub fn clear_access_token(&mut self) -> Option<AccessToken> {
        self.access_token.take()
    }

    /// Build the "Sign In with LinkedIn" URL.
    ///
    /// Generates a fresh CSRF state and writes it to `session`, replacing
    /// any earlier in-flight login for that session. Scopes are sent
    /// space-joined, e.g. `["r_basicprofile", "r_emailaddress"]`.
    pub fn login_url<S: AsRef<str>>(
        &self,
        scopes: &[S],
        session: &mut (impl SessionStore + ?Sized),
    ) -> Result<String> {
        let callback = self.config.require_callback()?;
        let authorize = &self.config.endpoints().authorize;
        let mut url = Url::parse(authorize).map_err(|e| {
            Error::Configuration(format!("invalid authorization endpoint {authorize}: {e}"))
        })?;

        let state = generate_state();
        let scope = scopes
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", callback)
            .append_pair("state", &state)
            .append_pair("scope", &scope);

        session.set(STATE_SESSION_KEY, state);
        info!(scopes = scopes.len(), "login URL generated, state stored in session");
        Ok(url.into())
    }

    /// Exchange an authorization code for a token and keep it.
    ///
    /// On failure the previously held token (if any) is left untouched.
    pub async fn exchange_code(&mut self, code: &str) -> Result<AccessToken> {
        let token = token::exchange_code(self.transport.as_ref(), &self.config, code).await?;
        self.access_token = Some(token.clone());
        Ok(token)
    }

    /// Finish the login started by `login_url`.
    ///
    /// Explicit `code`/`state` take precedence over the callback
    /// parameters. The stored state is removed from the session before
    /// comparison, so each state value validates at most once.
    pub async fn complete_login(
        &mut self,
        code: Option<&str>,
        state: Option<&str>,
        callback: &CallbackParams,
        session: &mut (impl SessionStore + ?Sized),
    ) -> Result<AccessToken> {
        let code = match code.filter(|c| !c.is_empty()).or_else(|| callback.code()) {
            Some(code) => code,
            None => {
                if let Some(error) = callback.error() {
                    let description = callback.error_description.as_deref().unwrap_or("");
                    warn!(error, description, "authorization denied by provider");
                    return Err(Error::Login(format!(
                        "authorization denied: {error}: {description}"
                    )));
                }
                return Err(Error::Login("authorization code missing".into()));
            }
        };

        let state = state
            .filter(|s| !s.is_empty())
            .or_else(|| callback.state())
            .ok_or_else(|| Error::Login("state missing".into()))?;

        let expected = session.remove(STATE_SESSION_KEY);
        let valid = expected
            .as_deref()
            .is_some_and(|expected| verify_state(expected, state));
        if !valid {
            warn!(
                in_flight = expected.is_some(),
                "csrf state verification failed"
            );
            return Err(Error::Login("csrf state mismatch".into()));
        }

        debug!("csrf state verified");
        self.exchange_code(code).await
    }
}
