//! LinkedIn Login Demo
//!
//! Small web service that walks a browser through "Sign In with LinkedIn":
//! 1. `/login` stores a CSRF state in the browser's session and redirects
//!    to LinkedIn
//! 2. `/callback` verifies the state and exchanges the code for a token
//! 3. `/me` calls the v1 API with that token and returns the profile

mod config;
mod error;
mod metrics;
mod session;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use linkedin_api::{ApiClient, RequestData};
use linkedin_auth::{AuthClient, CallbackParams, ClientConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{ReqwestTransport, Transport};

use crate::config::Config;
use crate::error::Error;
use crate::session::{SessionRegistry, session_cookie, session_id};

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    client_config: ClientConfig,
    scopes: Arc<[String]>,
    profile_resource: Arc<str>,
    transport: Arc<dyn Transport>,
    sessions: SessionRegistry,
    started_at: Instant,
    prometheus: PrometheusHandle,
}

impl AppState {
    /// A fresh auth client for one request. Clients are per session; the
    /// transport (and its connection pool) is shared.
    fn auth_client(&self) -> AuthClient {
        AuthClient::with_transport(self.client_config.clone(), Arc::clone(&self.transport))
    }
}

/// Build the axum router with all routes and shared state.
fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/login", get(login_handler))
        .route("/callback", get(callback_handler))
        .route("/me", get(me_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting linkedin-login-demo");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let client_config = config
        .client_config()
        .context("invalid LinkedIn application settings")?;

    info!(
        listen_addr = %config.server.listen_addr,
        client_id = %client_config.client_id(),
        callback_url = client_config.callback_url().unwrap_or_default(),
        authorize = %client_config.endpoints().authorize,
        scopes = config.linkedin.scopes.len(),
        "configuration loaded"
    );

    let prometheus = metrics::install_recorder().context("failed to install metrics recorder")?;

    let state = AppState {
        client_config,
        scopes: config.linkedin.scopes.clone().into(),
        profile_resource: config.linkedin.profile_resource.as_str().into(),
        transport: Arc::new(ReqwestTransport::new()),
        sessions: SessionRegistry::new(
            config.server.max_sessions,
            Duration::from_secs(config.server.session_idle_secs),
        ),
        started_at: Instant::now(),
        prometheus,
    };
    let app = build_router(state, config.server.max_connections);

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.listen_addr))?;
    info!(addr = %config.server.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Start a login: store fresh state in the browser's session, redirect to LinkedIn.
async fn login_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, session) = state.sessions.get_or_create(session_id(&headers)).await;

    let url = {
        let mut session = session.lock().await;
        state
            .auth_client()
            .login_url(&state.scopes[..], &mut session.store)
    };

    match url {
        Ok(url) => {
            metrics::record_login_started();
            info!(session = %id, "redirecting to LinkedIn authorization");
            let secure = state
                .client_config
                .callback_url()
                .is_some_and(|callback| callback.starts_with("https://"));
            ([(SET_COOKIE, session_cookie(id, secure))], Redirect::to(&url)).into_response()
        }
        Err(e) => login_failed(e.into()),
    }
}

/// LinkedIn redirect target: verify state, exchange code, keep the token.
async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, &headers, &params).await {
        Ok(()) => {
            metrics::record_login_completed();
            Redirect::to("/me").into_response()
        }
        Err(e) => login_failed(e),
    }
}

async fn complete_login(
    state: &AppState,
    headers: &HeaderMap,
    params: &CallbackParams,
) -> error::Result<()> {
    let id = session_id(headers).ok_or(Error::NoSession)?;
    let session = state.sessions.get(id).await.ok_or(Error::NoSession)?;
    let mut session = session.lock().await;

    let mut auth = state.auth_client();
    let token = auth
        .complete_login(None, None, params, &mut session.store)
        .await?;
    session.token = Some(token);

    info!(session = %id, "login completed");
    Ok(())
}

fn login_failed(err: Error) -> Response {
    warn!(reason = err.reason(), error = %err, "login failed");
    metrics::record_login_failed(err.reason());
    err.into_response()
}

/// Fetch the logged-in user's profile.
async fn me_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match fetch_profile(&state, &headers).await {
        Ok(body) => {
            metrics::record_api_request("ok");
            axum::Json(body).into_response()
        }
        Err(e) => {
            metrics::record_api_request("error");
            warn!(error = %e, "profile request failed");
            e.into_response()
        }
    }
}

async fn fetch_profile(state: &AppState, headers: &HeaderMap) -> error::Result<serde_json::Value> {
    let id = session_id(headers).ok_or(Error::NotLoggedIn)?;
    let session = state.sessions.get(id).await.ok_or(Error::NotLoggedIn)?;
    let token = session.lock().await.token.clone().ok_or(Error::NotLoggedIn)?;

    let api = ApiClient::with_transport(
        Arc::clone(&state.transport),
        state.client_config.endpoints().api_base.clone(),
        Some(token),
    );
    let response = api
        .get(&state.profile_resource, &RequestData::new())
        .await?;

    Ok(serde_json::json!({
        "request_url": response.request_url,
        "profile": response.data,
    }))
}

/// Liveness: uptime and live session count.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "sessions": state.sessions.len().await,
    });
    (
        axum::http::StatusCode::OK,
        [(CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics in the text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{COOKIE, LOCATION};
    use axum::http::{Request, StatusCode};
    use linkedin_auth::Endpoints;
    use tower::ServiceExt;
    use transport::CannedTransport;

    fn test_prometheus_handle() -> PrometheusHandle {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        recorder.handle()
    }

    fn test_app_state(transport: Arc<CannedTransport>) -> AppState {
        test_app_state_with_callback(transport, "http://localhost:8080/callback")
    }

    fn test_app_state_with_callback(transport: Arc<CannedTransport>, callback: &str) -> AppState {
        let client_config = ClientConfig::new("77abc123", "secret")
            .unwrap()
            .with_callback(callback)
            .with_endpoints(Endpoints::default());
        AppState {
            client_config,
            scopes: vec!["r_basicprofile".to_owned()].into(),
            profile_resource: "/people/~".into(),
            transport,
            sessions: SessionRegistry::new(16, Duration::from_secs(60)),
            started_at: Instant::now(),
            prometheus: test_prometheus_handle(),
        }
    }

    async fn send(state: &AppState, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        build_router(state.clone(), 16)
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Run `/login` and return (cookie pair, state from the redirect URL).
    async fn start_login(state: &AppState) -> (String, String) {
        let response = send(state, "/login", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let cookie = response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_owned();
        let location = response.headers()[LOCATION].to_str().unwrap();
        let location = url::Url::parse(location).unwrap();
        assert_eq!(location.path(), "/uas/oauth2/authorization");
        let login_state = location
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        (cookie, login_state)
    }

    #[tokio::test]
    async fn full_login_flow_reaches_profile() {
        let transport = Arc::new(
            CannedTransport::new()
                .with_body(r#"{"access_token":"abc123","expires_in":5184000}"#)
                .with_body(r#"{"id":"123","firstName":"Ada"}"#),
        );
        let state = test_app_state(transport.clone());

        let (cookie, login_state) = start_login(&state).await;

        let response = send(
            &state,
            &format!("/callback?code=auth-code&state={login_state}"),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/me");

        let response = send(&state, "/me", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["profile"]["id"], "123");
        assert_eq!(body["request_url"], "https://api.linkedin.com/v1/people/~");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].header_str("authorization"),
            Some("Bearer abc123")
        );
    }

    #[tokio::test]
    async fn login_reuses_existing_session() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let (cookie, _) = start_login(&state).await;

        let response = send(&state, "/login", Some(&cookie)).await;
        let again = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(again.starts_with(&cookie), "got: {again}");
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn session_cookie_is_secure_behind_https() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let response = send(&state, "/login", None).await;
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(!cookie.contains("Secure"), "got: {cookie}");

        let state = test_app_state_with_callback(
            Arc::new(CannedTransport::new()),
            "https://app.example.com/callback",
        );
        let response = send(&state, "/login", None).await;
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.ends_with("; Secure"), "got: {cookie}");
    }

    #[tokio::test]
    async fn forged_state_is_rejected() {
        let transport = Arc::new(CannedTransport::new().with_body(r#"{"access_token":"abc123"}"#));
        let state = test_app_state(transport.clone());
        let (cookie, _) = start_login(&state).await;

        let response = send(&state, "/callback?code=c&state=forged", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "csrf");
        assert_eq!(transport.request_count(), 0);

        let response = send(&state, "/me", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn callback_without_session_is_rejected() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let response = send(&state, "/callback?code=c&state=s", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "no_session");
    }

    #[tokio::test]
    async fn denied_consent_is_reported() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let (cookie, login_state) = start_login(&state).await;

        let uri = format!(
            "/callback?error=user_cancelled_authorize&error_description=cancelled&state={login_state}"
        );
        let response = send(&state, &uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "denied");
    }

    #[tokio::test]
    async fn rejected_code_is_bad_gateway() {
        let transport = Arc::new(
            CannedTransport::new()
                .with_body(r#"{"error":"invalid_request","error_description":"expired"}"#),
        );
        let state = test_app_state(transport);
        let (cookie, login_state) = start_login(&state).await;

        let response = send(
            &state,
            &format!("/callback?code=c&state={login_state}"),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"], "token_exchange");
    }

    #[tokio::test]
    async fn me_without_login_is_unauthorized() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let response = send(&state, "/me", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_error_is_passed_through() {
        let transport = Arc::new(
            CannedTransport::new()
                .with_body(r#"{"access_token":"abc123"}"#)
                .with_body(r#"{"errorCode":0,"message":"Invalid access token.","status":401}"#),
        );
        let state = test_app_state(transport);
        let (cookie, login_state) = start_login(&state).await;
        send(
            &state,
            &format!("/callback?code=c&state={login_state}"),
            Some(&cookie),
        )
        .await;

        let response = send(&state, "/me", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "api");
        assert_eq!(body["error_code"], 0);
    }

    #[tokio::test]
    async fn health_endpoint_returns_json() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let response = send(&state, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_text() {
        let state = test_app_state(Arc::new(CannedTransport::new()));
        let response = send(&state, "/metrics", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; version=0.0.4; charset=utf-8"
        );
    }
}
