//! Synchronous client for the CV-analysis service.
//!
//! Two endpoints are consumed:
//! - `GET /api/market-trends` → a loosely-typed [`RawMarketPayload`]
//! - `POST /api/analyze-cv` → a structured [`AnalysisReport`]
//!
//! Both share one error convention: any HTTP status >= 400, or a body that
//! carries a `detail`/`error` string field even on 2xx, is a failure. The
//! user-visible message is taken from `detail`, then `error`, then a generic
//! fallback embedding the status code.
//!
//! Typical usage:
//! ```no_run
//! # use cvtrends_rs::Client;
//! let client = Client::from_env();
//! let raw = client.fetch_market_trends()?;
//! let model = cvtrends_rs::normalize(&raw);
//! # Ok::<(), cvtrends_rs::api::ApiError>(())
//! ```

use crate::models::{AnalysisReport, RawMarketPayload};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default service host, matching the development server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the service base URL.
pub const BASE_URL_ENV: &str = "CVTRENDS_API_URL";

/// Backoff slept before each retry of a transient failure, in order.
const RETRY_BACKOFF_MS: [u64; 3] = [100, 300, 700];

/// Failure taxonomy at the HTTP boundary. Both variants collapse to a single
/// human-readable message via `Display`; callers do not branch on them beyond
/// the message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, timeout, or any other transport-level failure.
    #[error("network error: {0}")]
    Transport(String),
    /// Non-2xx status, or an error field reported inside the body.
    #[error("{0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Client {
    /// Client against an explicit base URL (scheme + host, no trailing path).
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("cvtrends_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Client using [`BASE_URL_ENV`] when set, [`DEFAULT_BASE_URL`] otherwise.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    /// Fetch the current market-trends payload.
    ///
    /// Transient failures (5xx, transport errors) are retried with a short
    /// backoff before giving up; client errors fail immediately. The payload
    /// itself is returned untyped-ish: shape cleanup is [`crate::normalize`]'s
    /// job, not the client's.
    pub fn fetch_market_trends(&self) -> Result<RawMarketPayload, ApiError> {
        let url = format!("{}/api/market-trends", self.base_url);

        let mut last_err: Option<ApiError> = None;
        let mut backoff = RETRY_BACKOFF_MS.into_iter();
        loop {
            match self.http.get(&url).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_server_error() {
                        last_err = Some(ApiError::Server(failure_message(resp)));
                    } else if !status.is_success() {
                        return Err(ApiError::Server(failure_message(resp)));
                    } else {
                        let body: Value = resp
                            .json()
                            .map_err(|e| ApiError::Server(format!("decode json: {e}")))?;
                        if let Some(msg) = embedded_error(&body) {
                            return Err(ApiError::Server(msg));
                        }
                        return serde_json::from_value(body)
                            .map_err(|e| ApiError::Server(format!("unexpected response shape: {e}")));
                    }
                }
                Err(e) => last_err = Some(ApiError::Transport(e.to_string())),
            }
            // Sleep only when another attempt follows.
            let Some(backoff_ms) = backoff.next() else { break };
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        Err(last_err.unwrap_or_else(|| ApiError::Transport("request failed".into())))
    }

    /// Submit résumé text for analysis. No retry: the call is expensive on
    /// the server side and user-triggered, so failures surface immediately.
    pub fn analyze_cv(&self, cv_text: &str) -> Result<AnalysisReport, ApiError> {
        let url = format!("{}/api/analyze-cv", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "cv_text": cv_text }))
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Server(failure_message(resp)));
        }
        let body: Value = resp
            .json()
            .map_err(|e| ApiError::Server(format!("decode json: {e}")))?;
        if let Some(msg) = embedded_error(&body) {
            return Err(ApiError::Server(msg));
        }
        serde_json::from_value(body)
            .map_err(|e| ApiError::Server(format!("unexpected response shape: {e}")))
    }
}

/// Error message embedded in a response body, if any (`detail` wins over
/// `error`). The service reports failures this way even on 2xx responses.
pub fn embedded_error(body: &Value) -> Option<String> {
    for key in ["detail", "error"] {
        if let Some(Value::String(msg)) = body.get(key)
            && !msg.trim().is_empty()
        {
            return Some(msg.clone());
        }
    }
    None
}

/// Generic message used when the body carries no usable error text.
pub fn status_fallback_message(status: StatusCode) -> String {
    format!("server error: {}", status.as_u16())
}

/// Message for a response with an error status. The body is decoded only to
/// look for an embedded message; a body that is not JSON (HTML error pages,
/// plain text) falls back to the status message instead of surfacing a parse
/// error.
fn failure_message(resp: Response) -> String {
    let status = resp.status();
    resp.json::<Value>()
        .ok()
        .and_then(|b| embedded_error(&b))
        .unwrap_or_else(|| status_fallback_message(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_wins_over_error() {
        let body = json!({"detail": "quota exceeded", "error": "other"});
        assert_eq!(embedded_error(&body), Some("quota exceeded".into()));
    }

    #[test]
    fn blank_error_fields_are_ignored() {
        assert_eq!(embedded_error(&json!({"detail": "  "})), None);
        assert_eq!(embedded_error(&json!({"error": 42})), None);
        assert_eq!(embedded_error(&json!({"skills": []})), None);
    }

    #[test]
    fn fallback_embeds_the_status() {
        assert_eq!(
            status_fallback_message(StatusCode::BAD_GATEWAY),
            "server error: 502"
        );
    }
}
