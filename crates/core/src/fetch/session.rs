//! reqwest-backed transport with cookie persistence for a single run.

use super::{resolve_url, FetchConfig, StepResult, Transport, TransportError};
use crate::form::Payload;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub struct HttpSession {
    client: Client,
    origin: Url,
    current_url: Option<Url>,
    max_response_bytes: usize,
}

impl HttpSession {
    /// Build a fresh session with its own cookie jar. Sessions are never shared between runs.
    pub fn new(origin: &str, config: &FetchConfig) -> Result<Self, TransportError> {
        let origin = Url::parse(origin).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let cookie_store = Arc::new(reqwest::cookie::Jar::default());
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_provider(cookie_store)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            origin,
            current_url: None,
            max_response_bytes: config.max_response_bytes,
        })
    }

    fn finish(&mut self, response: Result<Response, reqwest::Error>) -> Result<StepResult, TransportError> {
        let response = response.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let url = response.url().clone();
        let body = read_response_text_limited(response, self.max_response_bytes)?;
        self.current_url = Some(url.clone());

        Ok(StepResult {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

impl Transport for HttpSession {
    fn get(&mut self, url: &str) -> Result<StepResult, TransportError> {
        let target = resolve_url(&self.origin, self.current_url.as_ref(), url)?;
        tracing::debug!(url = %target, "GET");
        let response = self.client.get(target.as_str()).send();
        self.finish(response)
    }

    fn post(&mut self, target: &str, payload: &Payload) -> Result<StepResult, TransportError> {
        let target = resolve_url(&self.origin, self.current_url.as_ref(), target)?;
        tracing::debug!(url = %target, fields = payload.len(), "POST");
        let response = self.client.post(target.as_str()).form(payload.pairs()).send();
        self.finish(response)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|e| TransportError::Client(format!("bad header {value:?}: {e}")))
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

fn read_response_text_limited(response: Response, limit: usize) -> Result<String, TransportError> {
    let mut buf = Vec::new();
    response
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::TimedOut => TransportError::Timeout(e.to_string()),
            _ => TransportError::Network(e.to_string()),
        })?;
    if buf.len() > limit {
        return Err(TransportError::TooLarge(limit));
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
