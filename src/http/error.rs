//! Error types for wallet RPC client operations.
//!
//! This module defines the [`ClientError`] enum which encompasses all possible
//! failure modes when talking to a JoinMarket wallet daemon, together with
//! [`TransportError`] (the transport adapter could not complete) and
//! [`ResolvedError`] (the server answered with a non-success status).

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use super::request::ApiResponse;

/// Errors that can occur during wallet RPC client operations.
///
/// # Error Categories
///
/// - **Transport failures**: [`Transport`](ClientError::Transport). The request
///   never produced a response (network unreachable, call cancelled). These are
///   surfaced as-is and never routed through error resolution.
/// - **Protocol failures**: [`Resolved`](ClientError::Resolved). The server
///   answered outside the 2xx range; the error carries the raw response and a
///   human-readable message.
/// - **Contract violations**: [`ContractViolation`](ClientError::ContractViolation).
///   A 2xx response arrived without the body the operation promises.
/// - **Client errors**: [`Middleware`](ClientError::Middleware),
///   [`Url`](ClientError::Url), [`InvalidPath`](ClientError::InvalidPath),
///   [`Json`](ClientError::Json)
///
/// # Example
///
/// ```rust,no_run
/// use jm_wallet_client::http::ClientError;
///
/// fn handle_error(err: ClientError) {
///     match err {
///         ClientError::Resolved(resolved) => {
///             eprintln!("Server returned {}: {}", resolved.status(), resolved.message());
///         }
///         ClientError::Transport(e) => {
///             eprintln!("Network error: {}", e);
///         }
///         _ => eprintln!("Other error: {}", err),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport adapter could not complete the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned a non-success HTTP status code.
    #[error(transparent)]
    Resolved(#[from] ResolvedError),

    /// The server answered with a success status but without the body the
    /// operation is defined to return.
    #[error("Server returned no data for '{operation}' despite a success status")]
    ContractViolation {
        /// Name of the operation that was called.
        operation: &'static str,
    },

    /// A request or response middleware hook failed.
    #[error("Middleware error: {0}")]
    Middleware(#[source] anyhow::Error),

    /// Failed to parse or construct a URL.
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `data:` URLs).
    #[error("Base URL cannot be a base for operation paths: {0}")]
    InvalidPath(String),

    /// Failed to serialize the request body or decode a success body.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns the raw response if this error came from a non-success status.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ClientError::Resolved(resolved) => Some(resolved.response()),
            _ => None,
        }
    }

    /// Returns `true` if the call was aborted through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::Cancelled))
    }
}

/// Failures raised by a [`Transport`](super::Transport) before any response exists.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The cancellation token attached to the request fired.
    #[error("Request cancelled")]
    Cancelled,

    /// The HTTP request failed due to a network or connection error.
    ///
    /// This typically indicates connectivity issues such as connection refused,
    /// timeouts, DNS resolution failure or TLS handshake errors. When transport
    /// retries are enabled it may also mean all attempts were exhausted.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// Any other adapter-specific failure.
    #[error("Transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(reqwest_middleware::Error::Reqwest(err))
    }
}

/// A non-success response turned into a human-readable failure.
///
/// Only the error resolution subsystem ([`resolve_failure`](super::resolve_failure))
/// constructs this type. The triggering response is kept so callers can branch
/// on the status code.
#[derive(Debug)]
pub struct ResolvedError {
    response: ApiResponse,
    message: String,
}

impl ResolvedError {
    pub(crate) fn new(response: ApiResponse, message: String) -> Self {
        Self { response, message }
    }

    /// The final, contextual error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The raw response that triggered the failure.
    pub fn response(&self) -> &ApiResponse {
        &self.response
    }

    /// Shorthand for `self.response().status()`.
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn into_response(self) -> ApiResponse {
        self.response
    }
}

impl fmt::Display for ResolvedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResolvedError {}
