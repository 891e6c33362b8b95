//! Query parameters LinkedIn sends to the callback URL

use serde::Deserialize;
use url::form_urlencoded;

/// Inbound callback parameters.
///
/// On success LinkedIn sends `code` and `state`; when the user declines it
/// sends `error` and `error_description` instead (RFC 6749 §4.1.2.1).
/// Deserializable so web frameworks can extract it from the query directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string (without the leading `?`).
    /// Unknown keys are ignored; the last occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }
        params
    }

    pub fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref())
    }

    pub fn state(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }

    pub fn error(&self) -> Option<&str> {
        non_empty(self.error.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_state() {
        let params = CallbackParams::from_query("code=AQTx%2By&state=abc-123");
        assert_eq!(params.code(), Some("AQTx+y"));
        assert_eq!(params.state(), Some("abc-123"));
        assert!(params.error().is_none());
    }

    #[test]
    fn parses_provider_denial() {
        let params = CallbackParams::from_query(
            "?error=user_cancelled_login&error_description=The+user+cancelled+LinkedIn+login&state=s",
        );
        assert_eq!(params.error(), Some("user_cancelled_login"));
        assert_eq!(
            params.error_description.as_deref(),
            Some("The user cancelled LinkedIn login")
        );
        assert!(params.code().is_none());
    }

    #[test]
    fn empty_values_count_as_absent() {
        let params = CallbackParams::from_query("code=&state=");
        assert!(params.code().is_none());
        assert!(params.state().is_none());
    }

    #[test]
    fn deserializes_from_json_map() {
        let params: CallbackParams =
            serde_json::from_str(r#"{"code":"c","state":"s","extra":"ignored"}"#).unwrap();
        assert_eq!(params.code(), Some("c"));
        assert_eq!(params.state(), Some("s"));
    }
}
