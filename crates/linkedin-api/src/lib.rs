//! Authenticated requests against the LinkedIn v1 REST API
//!
//! `ApiClient` adds the bearer token and `x-li-format: json` header to every
//! request, sends GET data as a query string and POST data as a form body,
//! and turns the JSON body into either a `Response` or an `Error::Api`
//! when LinkedIn reports an `errorCode`.

pub mod client;
pub mod error;
pub mod response;

pub use client::{ApiClient, FORMAT_HEADER, Method, RequestData};
pub use error::{Error, Result};
pub use response::Response;
