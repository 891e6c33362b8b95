//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret is loaded from LINKEDIN_CLIENT_SECRET or
//! client_secret_file, never stored in the TOML directly.

use common::Secret;
use linkedin_auth::{ClientConfig, Endpoints};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable holding the LinkedIn client secret
pub const CLIENT_SECRET_ENV: &str = "LINKEDIN_CLIENT_SECRET";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub linkedin: LinkedInConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Upper bound on browser sessions held in memory
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions unused for this long are dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

/// LinkedIn application settings
#[derive(Debug, Deserialize)]
pub struct LinkedInConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Path to a file containing the client secret (alternative to the env var)
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    pub callback_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    /// Serve all LinkedIn endpoints from this base instead of production
    #[serde(default)]
    pub endpoint_base: Option<String>,
    /// Resource fetched by `/me`
    #[serde(default = "default_profile_resource")]
    pub profile_resource: String,
}

fn default_max_connections() -> usize {
    256
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_idle_secs() -> u64 {
    3600
}

fn default_scopes() -> Vec<String> {
    vec!["r_basicprofile".to_owned()]
}

fn default_profile_resource() -> String {
    "/people/~:(id,first-name,last-name,headline)".to_owned()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Client secret resolution order:
    /// 1. LINKEDIN_CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if config.linkedin.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }

        if !is_http_url(&config.linkedin.callback_url) {
            return Err(common::Error::Config(format!(
                "callback_url must start with http:// or https://, got: {}",
                config.linkedin.callback_url
            )));
        }

        if let Some(base) = &config.linkedin.endpoint_base {
            if !is_http_url(base) {
                return Err(common::Error::Config(format!(
                    "endpoint_base must start with http:// or https://, got: {base}"
                )));
            }
        }

        if config.linkedin.scopes.is_empty() {
            return Err(common::Error::Config(
                "scopes must list at least one permission".into(),
            ));
        }

        if !config.linkedin.profile_resource.starts_with('/') {
            return Err(common::Error::Config(
                "profile_resource must start with '/'".into(),
            ));
        }

        if config.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if config.server.max_sessions == 0 {
            return Err(common::Error::Config(
                "max_sessions must be greater than 0".into(),
            ));
        }

        if config.server.session_idle_secs == 0 {
            return Err(common::Error::Config(
                "session_idle_secs must be greater than 0".into(),
            ));
        }

        // Env var takes precedence over file
        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            config.linkedin.client_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = config.linkedin.client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                config.linkedin.client_secret = Some(Secret::new(secret));
            }
        }

        Ok(config)
    }

    /// Build the library client config. Fails when no secret was resolved.
    pub fn client_config(&self) -> common::Result<ClientConfig> {
        let secret = self.linkedin.client_secret.clone().ok_or_else(|| {
            common::Error::Config(format!(
                "client secret not provided: set {CLIENT_SECRET_ENV} or client_secret_file"
            ))
        })?;

        let endpoints = match &self.linkedin.endpoint_base {
            Some(base) => Endpoints::with_base(base),
            None => Endpoints::default(),
        };

        ClientConfig::new(self.linkedin.client_id.clone(), secret)
            .map(|c| {
                c.with_callback(self.linkedin.callback_url.clone())
                    .with_endpoints(endpoints)
            })
            .map_err(|e| common::Error::Config(e.to_string()))
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("linkedin-login-demo.toml")
    }
}
