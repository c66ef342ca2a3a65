//! Transport adapter: the only place that performs network I/O.

use std::time::Duration;

use async_trait::async_trait;
use log::trace;
use reqwest_middleware::ClientWithMiddleware;

use super::error::TransportError;
use super::request::{ApiRequest, ApiResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 0;

/// Executes a single HTTP request.
///
/// Implementations must honour [`ApiRequest::cancel`]: once the token fires
/// the in-flight operation is dropped and [`TransportError::Cancelled`] is
/// returned.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] backed by a reqwest client with optional transient retries.
pub struct ReqwestTransport {
    client: ClientWithMiddleware,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::with_config(DEFAULT_MAX_RETRIES, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// `max_retries == 0` disables the retry middleware entirely.
    pub fn with_config(max_retries: u32, timeout: Duration) -> Result<Self, anyhow::Error> {
        let inner_client = reqwest::Client::builder().timeout(timeout).build()?;

        let mut builder = reqwest_middleware::ClientBuilder::new(inner_client);
        if max_retries > 0 {
            let retry_policy =
                reqwest_retry::policies::ExponentialBackoff::builder().build_with_max_retries(max_retries);
            builder = builder.with(reqwest_retry::RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            client: builder.build(),
        })
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, TransportError> {
        match request.cancel.take() {
            Some(token) => {
                let url = request.url.clone();
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        trace!(url:% = url; "Request cancelled before completion");
                        Err(TransportError::Cancelled)
                    }
                    result = self.execute(request) => result,
                }
            },
            None => self.execute(request).await,
        }
    }
}
