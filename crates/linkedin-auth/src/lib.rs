//! LinkedIn OAuth2 authorization-code login
//!
//! Login flow:
//! 1. `AuthClient::login_url()` stores a fresh CSRF state in the caller's
//!    session and returns the LinkedIn authorization URL
//! 2. The user signs in and LinkedIn redirects to the callback with
//!    `code` and `state`
//! 3. `AuthClient::complete_login()` checks the state against the session
//!    (single use) and calls `AuthClient::exchange_code()`
//! 4. The returned `AccessToken` is held by the client and can be handed to
//!    the API client
//!
//! HTTP goes through `transport::Transport`; session storage goes through
//! `SessionStore`. Neither is global.

pub mod callback;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod session;
pub mod state;
pub mod token;

pub use callback::CallbackParams;
pub use client::AuthClient;
pub use config::{ClientConfig, Endpoints};
pub use constants::*;
pub use error::{Error, Result};
pub use session::{MemorySession, SessionStore};
pub use state::{generate_state, verify_state};
pub use token::{AccessToken, TokenResponse, exchange_code};
