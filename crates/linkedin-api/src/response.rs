//! Result record of one API request

use serde::Serialize;
use serde_json::Value;

use crate::client::RequestData;

/// What was sent and what came back.
///
/// `request_url` includes the query string for GET requests, which makes it
/// directly usable when reporting a failed lookup. `data` is `Null` when
/// LinkedIn returned an empty body (e.g. `201 Created` for a share).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub request_url: String,
    pub request_data: RequestData,
    pub data: Value,
}

impl Response {
    /// Field of the top-level JSON object, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Deserialize the body into a typed record.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.data)
    }
}
