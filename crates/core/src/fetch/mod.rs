//! Page transport: one GET or POST per wizard step over a cookie-bearing session.
//! The reqwest-backed session is gated behind the "fetch" feature.

#[cfg(feature = "fetch")]
mod session;

#[cfg(feature = "fetch")]
pub use session::HttpSession;

use crate::form::{FormError, PageModel, Payload};
use serde::Deserialize;
use url::Url;

/// Configuration for the HTTP session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// User-Agent header.
    pub user_agent: String,
    /// Accept header sent with every request.
    pub accept: String,
    /// Accept-Language header sent with every request.
    pub accept_language: String,
    /// Per-request timeout in seconds, covering connect, send and body read.
    pub timeout_secs: u64,
    /// Bodies larger than this are rejected.
    pub max_response_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9,de;q=0.8".to_string(),
            timeout_secs: 30,
            max_response_bytes: 5 * 1024 * 1024,
        }
    }
}

/// One completed request/response exchange.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    pub body: String,
}

impl StepResult {
    /// The page's active form.
    pub fn page(&self) -> Result<PageModel, FormError> {
        PageModel::parse(&self.body)
    }
}

/// The narrow interface the wizard drives. Implementations own the session
/// (cookies, default headers) for exactly one run.
pub trait Transport {
    fn get(&mut self, url: &str) -> Result<StepResult, TransportError>;

    /// POST `payload` urlencoded to `target`, which may be absolute,
    /// root-relative, bare-relative or empty.
    fn post(&mut self, target: &str, payload: &Payload) -> Result<StepResult, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
    #[error("response too large (limit {0} bytes)")]
    TooLarge(usize),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

/// Resolve a form action against the site origin. An empty action means "the
/// current page", as browsers treat it.
pub fn resolve_url(origin: &Url, current: Option<&Url>, target: &str) -> Result<Url, TransportError> {
    let target = target.trim();
    if target.is_empty() {
        return Ok(current.unwrap_or(origin).clone());
    }
    let url = origin
        .join(target)
        .map_err(|e| TransportError::InvalidUrl(format!("{target}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TransportError::InvalidUrl(format!(
            "{target}: unsupported scheme {other}"
        ))),
    }
}
