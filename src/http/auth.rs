//! Bearer token injection.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use super::middleware::Middleware;
use super::request::ApiRequest;

/// Request-phase middleware that sets `Authorization: Bearer <token>`.
///
/// The token is formatted, never validated; the wallet daemon decides whether
/// it is acceptable. No other header is read or written and the response
/// phase is left alone.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    async fn on_request(&self, request: &ApiRequest) -> anyhow::Result<Option<ApiRequest>> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token))?;
        value.set_sensitive(true);

        let mut request = request.clone();
        request.headers.insert(AUTHORIZATION, value);
        Ok(Some(request))
    }
}
