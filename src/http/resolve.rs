//! Turns non-success responses into human-readable failures.
//!
//! Resolution happens in two steps:
//!
//! 1. [`extract_error_message`] turns an opaque body (JSON or an HTML error
//!    page from a proxy) into a reason string. It never fails.
//! 2. [`resolve_failure`] hands that reason to a call-site specific
//!    [`ResolverPolicy`] which produces the final message, and returns it as
//!    [`ClientError::Resolved`].
//!
//! Call sites own all user-facing wording; this module only supplies the
//! fixed prefix used for HTML error pages.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use super::error::{ClientError, ResolvedError};
use super::request::ApiResponse;

/// Prefix put in front of the `<title>` of an HTML error page.
pub const HTML_ERROR_PREFIX: &str = "The server reported a problem: ";

type ResolverFn = dyn Fn(&ApiResponse, &str) -> String + Send + Sync;

/// Per-call-site policy for turning a reason into the final message.
pub struct ResolverPolicy {
    resolver: Box<ResolverFn>,
    fallback_reason: Option<String>,
}

impl ResolverPolicy {
    /// Identity resolver, fallback reason is the response's status text.
    pub fn new() -> Self {
        Self {
            resolver: Box::new(|_, reason| reason.to_string()),
            fallback_reason: None,
        }
    }

    /// Uses `resolver` to contextualize the extracted reason. If it returns an
    /// empty string the raw reason is used instead.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ApiResponse, &str) -> String + Send + Sync + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    /// Reason used when nothing useful can be extracted from the body.
    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = Some(reason.into());
        self
    }
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolverPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverPolicy")
            .field("fallback_reason", &self.fallback_reason)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn title_pattern() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").expect("title pattern is valid"))
}

fn comment_pattern() -> &'static Regex {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"))
}

fn whitespace_pattern() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"[ \t\n\r\x0C]+").expect("whitespace pattern is valid"))
}

/// The document title as a browser would report it: comments are ignored,
/// entities decoded and ASCII whitespace runs collapsed to a single space.
fn document_title(html: &str) -> Option<String> {
    let html = comment_pattern().replace_all(html, "");
    let raw = title_pattern().captures(&html)?.get(1)?.as_str();
    let decoded = html_escape::decode_html_entities(raw);
    let title = whitespace_pattern()
        .replace_all(decoded.trim_matches(|c: char| c.is_ascii_whitespace()), " ")
        .into_owned();
    (!title.is_empty()).then_some(title)
}

fn is_html(response: &ApiResponse) -> bool {
    response
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
}

/// Extracts a human-readable reason from an error response.
///
/// HTML documents yield their `<title>` behind [`HTML_ERROR_PREFIX`]; any
/// other body is parsed as `{"message": "..."}`. Whenever that does not
/// produce a non-empty string, `fallback_reason` is returned.
pub fn extract_error_message(response: &ApiResponse, fallback_reason: &str) -> String {
    if is_html(response) {
        return match document_title(&response.text()) {
            Some(title) => format!("{HTML_ERROR_PREFIX}{title}"),
            None => fallback_reason.to_string(),
        };
    }

    match response.json::<ErrorBody>() {
        Ok(ErrorBody { message: Some(message) }) if !message.is_empty() => message,
        Ok(_) => fallback_reason.to_string(),
        Err(e) => {
            debug!(error:% = e; "Error body is not a JSON error object");
            fallback_reason.to_string()
        },
    }
}

/// Builds the [`ResolvedError`] for `response` under `policy`.
pub fn resolve(response: ApiResponse, policy: &ResolverPolicy) -> ResolvedError {
    let fallback = match &policy.fallback_reason {
        Some(reason) => reason.clone(),
        None => response.status_text(),
    };
    let reason = extract_error_message(&response, &fallback);
    let resolved = (policy.resolver)(&response, &reason);
    let message = if resolved.is_empty() { reason } else { resolved };

    ResolvedError::new(response, message)
}

/// Terminal failure exit for a non-success response.
///
/// Always returns `Err(ClientError::Resolved(..))`; the generic success type
/// lets call sites use it directly as the value of a failing branch.
pub fn resolve_failure<T>(response: ApiResponse, policy: &ResolverPolicy) -> Result<T, ClientError> {
    Err(ClientError::Resolved(resolve(response, policy)))
}
