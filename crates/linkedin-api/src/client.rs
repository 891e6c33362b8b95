//! Authenticated request dispatch

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use linkedin_auth::{API_BASE, AccessToken, AuthClient, FORM_CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};
use transport::header::{AUTHORIZATION, CONTENT_TYPE};
use transport::{HeaderName, HttpRequest, ReqwestTransport, Transport};
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::response::Response;

/// Header asking LinkedIn for JSON instead of XML
pub const FORMAT_HEADER: &str = "x-li-format";

/// Request parameters: query string for GET, form body for POST.
pub type RequestData = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(Error::InvalidRequest(format!("unsupported method {other}"))),
        }
    }
}

impl From<Method> for transport::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => transport::Method::GET,
            Method::Post => transport::Method::POST,
        }
    }
}

/// Client for the v1 REST API.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    api_base: String,
    access_token: Option<AccessToken>,
}

impl ApiClient {
    /// Client for production LinkedIn over the default reqwest transport.
    pub fn new(access_token: Option<AccessToken>) -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()), API_BASE, access_token)
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        api_base: impl Into<String>,
        access_token: Option<AccessToken>,
    ) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            access_token,
        }
    }

    /// Continue from a completed login: same transport, same API base,
    /// the token the auth client holds.
    pub fn from_auth(auth: &AuthClient) -> Result<Self> {
        let token = auth.access_token().cloned().ok_or(Error::MissingToken)?;
        Ok(Self::with_transport(
            auth.transport(),
            auth.config().endpoints().api_base.clone(),
            Some(token),
        ))
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

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub async fn get(&self, resource: &str, data: &RequestData) -> Result<Response> {
        self.request(resource, Method::Get, data).await
    }

    pub async fn post(&self, resource: &str, data: &RequestData) -> Result<Response> {
        self.request(resource, Method::Post, data).await
    }

    /// Issue one request against `api_base + resource`.
    ///
    /// `resource` is appended verbatim, so LinkedIn field selectors such as
    /// `/people/~:(id,first-name)` pass through unencoded.
    pub async fn request(
        &self,
        resource: &str,
        method: Method,
        data: &RequestData,
    ) -> Result<Response> {
        let token = self.access_token.as_ref().ok_or(Error::MissingToken)?;
        if !resource.starts_with('/') {
            return Err(Error::InvalidRequest(format!(
                "resource must start with '/', got {resource:?}"
            )));
        }

        let encoded = encode(data);
        let mut url = format!("{}{resource}", self.api_base);
        if method == Method::Get && !encoded.is_empty() {
            url.push(if resource.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        let mut request = HttpRequest::new(method.into(), url.as_str())
            .header(AUTHORIZATION, &token.bearer())?
            .header(HeaderName::from_static(FORMAT_HEADER), "json")?;
        if method == Method::Post {
            request = request
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)?
                .body(encoded);
        }

        debug!(%method, resource, params = data.len(), "dispatching API request");
        let response = self.transport.send(request).await?;

        let body = parse_body(&response.body)?;
        if let Some(err) = api_error(&body) {
            warn!(%method, resource, status = response.status, error = %err, "LinkedIn API returned an error");
            return Err(err);
        }

        Ok(Response {
            request_url: url,
            request_data: data.clone(),
            data: body,
        })
    }
}

fn encode(data: &RequestData) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(data.iter())
        .finish()
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| Error::InvalidResponse(format!("response body is not JSON: {e}")))
}

/// LinkedIn reports failures as `{"errorCode": .., "message": .., "status": ..}`.
fn api_error(body: &Value) -> Option<Error> {
    let code = body.get("errorCode").filter(|code| !code.is_null())?;
    let code = code
        .as_i64()
        .or_else(|| code.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or_default();
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let status = body
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    let request_id = body
        .get("requestId")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Some(Error::Api {
        message,
        code,
        status,
        request_id,
    })
}
