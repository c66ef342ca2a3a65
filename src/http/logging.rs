//! Diagnostic middleware; observes both phases and never replaces anything.

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use super::middleware::Middleware;
use super::request::{ApiRequest, ApiResponse};
use super::wallet_name::WALLET_FILE_SUFFIX;
use crate::log::mask_string;

const LOG_TARGET: &str = "jm_wallet_client::http::requests";

/// Logs every request and response through the `log` facade.
///
/// Headers are never logged, so credentials set by
/// [`BearerAuth`](super::BearerAuth) stay out of the output. Wallet file
/// names in the URL are masked unless `REVEAL_PII` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl RequestLogger {
    pub fn new() -> Self {
        Self
    }
}

/// `url` with every wallet file segment passed through [`mask_string`].
fn masked_url(url: &Url) -> String {
    let Some(segments) = url.path_segments() else {
        return url.to_string();
    };
    let path: Vec<String> = segments
        .map(|segment| {
            if segment.ends_with(WALLET_FILE_SUFFIX) {
                mask_string(segment)
            } else {
                segment.to_string()
            }
        })
        .collect();

    let mut masked = url.clone();
    masked.set_path(&format!("/{}", path.join("/")));
    masked.to_string()
}

#[async_trait]
impl Middleware for RequestLogger {
    async fn on_request(&self, request: &ApiRequest) -> anyhow::Result<Option<ApiRequest>> {
        debug!(
            target: LOG_TARGET,
            method:% = request.method,
            url:% = masked_url(&request.url),
            body_len = request.body.as_ref().map_or(0, Vec::len);
            "HTTP: Sending request"
        );
        Ok(None)
    }

    async fn on_response(
        &self,
        request: &ApiRequest,
        response: &ApiResponse,
    ) -> anyhow::Result<Option<ApiResponse>> {
        if response.is_success() {
            debug!(
                target: LOG_TARGET,
                method:% = request.method,
                url:% = masked_url(&request.url),
                status = response.status().as_u16();
                "HTTP: Received response"
            );
        } else {
            warn!(
                target: LOG_TARGET,
                method:% = request.method,
                url:% = masked_url(&request.url),
                status = response.status().as_u16(),
                content_type = response.content_type().unwrap_or("");
                "HTTP: Received error response"
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::sync::{Mutex, Once};

    use log::kv::{Key, Value, VisitSource};
    use log::{Log, Metadata, Record};
    use reqwest::header::HeaderMap;
    use reqwest::{Method, StatusCode};

    use super::*;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static INSTALL: Once = Once::new();

    struct CaptureLogger;

    struct LineVisitor<'a>(&'a mut String);

    impl<'kvs> VisitSource<'kvs> for LineVisitor<'_> {
        fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), log::kv::Error> {
            let _ = write!(self.0, " {key}={value}");
            Ok(())
        }
    }

    impl Log for CaptureLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.target() == LOG_TARGET
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let mut line = record.args().to_string();
            let _ = record.key_values().visit(&mut LineVisitor(&mut line));
            CAPTURED.lock().unwrap().push(line);
        }

        fn flush(&self) {}
    }

    fn captured_lines_containing(needle: &str) -> Vec<String> {
        INSTALL.call_once(|| {
            log::set_logger(&CaptureLogger).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
        CAPTURED
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.contains(needle))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn never_replaces_request_or_response() {
        let request = ApiRequest::new(Method::GET, Url::parse("http://localhost/api/v1/getinfo").unwrap());
        let ok = ApiResponse::new(StatusCode::OK, HeaderMap::new(), "{}");
        let failed = ApiResponse::new(StatusCode::BAD_GATEWAY, HeaderMap::new(), "");

        assert!(RequestLogger.on_request(&request).await.unwrap().is_none());
        assert!(RequestLogger.on_response(&request, &ok).await.unwrap().is_none());
        assert!(RequestLogger.on_response(&request, &failed).await.unwrap().is_none());
    }

    // REVEAL_PII is not set in the test environment.
    #[test]
    fn wallet_segments_are_masked() {
        let url = Url::parse("http://localhost/api/v1/wallet/alice-secret.jmdat/unlock").unwrap();
        assert_eq!(masked_url(&url), "http://localhost/api/v1/wallet/alice-....jmdat/unlock");

        let short = Url::parse("http://localhost/api/v1/wallet/bob.jmdat/display").unwrap();
        assert_eq!(masked_url(&short), "http://localhost/api/v1/wallet/***/display");

        let plain = Url::parse("http://localhost/api/v1/wallet/all").unwrap();
        assert_eq!(masked_url(&plain), "http://localhost/api/v1/wallet/all");
    }

    #[tokio::test]
    async fn logged_lines_never_contain_the_wallet_name() {
        // Installs the capturing logger before anything is logged.
        captured_lines_containing("");

        let url = Url::parse("http://localhost/api/v1/wallet/alice-secret.jmdat/unlock").unwrap();
        let request = ApiRequest::new(Method::POST, url);
        let unauthorized = ApiResponse::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), "");

        RequestLogger.on_request(&request).await.unwrap();
        RequestLogger.on_response(&request, &unauthorized).await.unwrap();

        assert!(captured_lines_containing("alice-secret").is_empty());
        let lines = captured_lines_containing("wallet/alice-....jmdat/unlock");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("HTTP: Sending request method=POST"));
        assert!(lines[1].contains("status=401"));
    }
}
