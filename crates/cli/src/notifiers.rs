//! Delivery channels for run outcomes.

use reqwest::blocking::Client;
use serde::Serialize;
use slotwatch_core::notify::{NotifyError, Notifier};
use slotwatch_core::Outcome;
use std::time::Duration;

/// Writes the outcome to the log. Always succeeds.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, outcome: &Outcome, detail: &str) -> bool {
        match outcome {
            Outcome::NoSlots => tracing::info!(outcome = outcome.kind(), "{outcome}"),
            Outcome::PossibleSlots { .. } => {
                tracing::warn!(outcome = outcome.kind(), detail, "{outcome}")
            }
            _ => tracing::error!(outcome = outcome.kind(), detail, "{outcome}"),
        }
        true
    }
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    outcome: &'a str,
    detail: &'a str,
    text: String,
}

/// POSTs a JSON message to a chat or alerting webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    fn send(&self, outcome: &Outcome, detail: &str) -> Result<(), NotifyError> {
        let body = WebhookBody {
            outcome: outcome.kind(),
            detail,
            text: outcome.to_string(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&mut self, outcome: &Outcome, detail: &str) -> bool {
        match self.send(outcome, detail) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "webhook delivery failed");
                false
            }
        }
    }
}
