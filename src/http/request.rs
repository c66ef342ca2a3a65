//! Request and response values that flow through the middleware pipeline.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

/// An outgoing request as seen by middleware and the transport adapter.
///
/// Middleware never mutates a request in place; a request hook returns a
/// replacement value instead (see [`Middleware`](super::Middleware)).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Honoured by the transport adapter; passed through middleware untouched.
    pub cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            cancel: None,
        }
    }

    /// Serializes `body` as JSON and sets the matching content type.
    pub fn with_json<B: serde::Serialize>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn with_cancel(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A response produced by the transport adapter.
///
/// The body is buffered once by the transport; afterwards the response is
/// immutable and can be read as text or JSON as often as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The canonical reason phrase, falling back to the numeric code for
    /// non-standard statuses.
    ///
    /// Unlike a fetch-style `statusText` this is derived from the status code
    /// alone; a custom reason phrase sent by the server is not preserved
    /// (HTTP/2 has none anyway).
    pub fn status_text(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => self.status.as_str().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Content-Type` header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
