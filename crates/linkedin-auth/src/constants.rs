//! LinkedIn endpoints and fixed protocol values

/// Base of the OAuth2 endpoints
pub const OAUTH_BASE: &str = "https://www.linkedin.com/uas/oauth2";

/// Authorization endpoint the user is redirected to
pub const AUTHORIZE_ENDPOINT: &str = "https://www.linkedin.com/uas/oauth2/authorization";

/// Token endpoint for the authorization code exchange
pub const TOKEN_ENDPOINT: &str = "https://www.linkedin.com/uas/oauth2/accessToken";

/// Base of the v1 REST API; resources are appended verbatim
pub const API_BASE: &str = "https://api.linkedin.com/v1";

/// Session key under which the in-flight CSRF state is stored
pub const STATE_SESSION_KEY: &str = "phpli_auth_state";

/// Content type for the token exchange and API POST bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
