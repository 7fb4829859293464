//! The wizard driver: a fixed, linear walk through the booking form.
//!
//! `Entry → Office → Calendar → Confirm(1..=K) → terminal page`
//!
//! Every step parses the previous response, builds the payload from it and
//! posts it. Any failure ends the run; nothing is retried, since replaying a
//! stale step's hidden tokens is not safe.

mod config;

pub use config::WizardConfig;

use crate::dom;
use crate::fetch::{StepResult, Transport, TransportError};
use crate::form::{build_payload, FieldKind, FormError, OptionMatcher, PageModel, Payload, StepInput};
use crate::notify::Notifier;
use crate::outcome::{self, Outcome};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Entry,
    Office,
    Calendar,
    Confirm(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Entry => write!(f, "entry"),
            Step::Office => write!(f, "office"),
            Step::Calendar => write!(f, "calendar"),
            Step::Confirm(k) => write!(f, "confirm {k}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{step}: {source}")]
    Transport { step: Step, source: TransportError },
    #[error("{step}: {reason}")]
    Structural {
        step: Step,
        reason: String,
        page_title: Option<String>,
    },
}

impl WizardError {
    pub fn step(&self) -> Step {
        match self {
            WizardError::Transport { step, .. } | WizardError::Structural { step, .. } => *step,
        }
    }

    fn into_outcome(self) -> Outcome {
        match self {
            WizardError::Transport { step, source } => Outcome::TransportFailure {
                step: step.to_string(),
                reason: source.to_string(),
            },
            WizardError::Structural {
                step,
                reason,
                page_title,
            } => Outcome::StructuralFailure {
                step: step.to_string(),
                reason,
                page_title,
            },
        }
    }
}

/// One network round-trip of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub steps: Vec<StepRecord>,
}

/// Drive one complete run over `transport` and classify the terminal page.
pub fn run<T: Transport + ?Sized>(transport: &mut T, config: &WizardConfig) -> RunReport {
    let mut driver = Driver {
        transport,
        config,
        steps: Vec::new(),
    };
    let outcome = match driver.drive() {
        Ok(terminal) => outcome::classify(&terminal.body, &config.marker),
        Err(e) => {
            tracing::error!(step = %e.step(), error = %e, "run aborted");
            e.into_outcome()
        }
    };
    tracing::info!(outcome = outcome.kind(), detail = %outcome.detail(), "run finished");
    RunReport {
        outcome,
        steps: driver.steps,
    }
}

/// [`run`], then hand the outcome to `notifier` exactly once.
pub fn run_and_notify<T, N>(transport: &mut T, config: &WizardConfig, notifier: &mut N) -> RunReport
where
    T: Transport + ?Sized,
    N: Notifier + ?Sized,
{
    let report = run(transport, config);
    if !notifier.notify(&report.outcome, &report.outcome.detail()) {
        tracing::warn!(outcome = report.outcome.kind(), "notification was not delivered");
    }
    report
}

struct Driver<'a, T: ?Sized> {
    transport: &'a mut T,
    config: &'a WizardConfig,
    steps: Vec<StepRecord>,
}

impl<T: Transport + ?Sized> Driver<'_, T> {
    /// Walk the wizard and return the terminal response.
    fn drive(&mut self) -> Result<StepResult, WizardError> {
        let cfg = self.config;

        let entry = self
            .transport
            .get(cfg.entry_url())
            .map_err(|source| WizardError::Transport { step: Step::Entry, source })?;
        self.record(Step::Entry, "GET", &entry);

        // Office
        let page = self.page(Step::Office, &entry)?;
        let input = StepInput::new(&cfg.office_submit)
            .select(&cfg.office_field, OptionMatcher::contains(&cfg.office_match));
        let payload = build_payload(&page, &input).map_err(|e| structural(Step::Office, e.to_string(), &page))?;
        let mut current = self.submit(Step::Office, &page, &input, &payload)?;

        // Calendar
        let page = match current.page() {
            Ok(page) => page,
            Err(_) => {
                return Err(WizardError::Structural {
                    step: Step::Calendar,
                    reason: "calendar field not found".to_string(),
                    page_title: title_of(&current),
                })
            }
        };
        let calendar_name = page
            .fields
            .iter()
            .find(|f| f.kind == FieldKind::Selectable && f.is_identified_by(&cfg.calendar_field))
            .map(|f| f.name.clone())
            .ok_or_else(|| structural(Step::Calendar, "calendar field not found", &page))?;
        tracing::debug!(
            field = %calendar_name,
            options = page.field(&calendar_name).map(|f| f.options.len()).unwrap_or(0),
            "calendar field located"
        );
        let input = StepInput::new(&cfg.calendar_submit)
            .select(calendar_name, OptionMatcher::contains(&cfg.calendar_match));
        let payload = build_payload(&page, &input).map_err(|e| match e {
            FormError::OptionNotFound { .. } => structural(Step::Calendar, "target class not offered", &page),
            other => structural(Step::Calendar, other.to_string(), &page),
        })?;
        current = self.submit(Step::Calendar, &page, &input, &payload)?;

        // Confirmations
        let input = StepInput::new(&cfg.confirm_submit);
        for k in 1..=cfg.confirm_steps {
            let step = Step::Confirm(k);
            let page = match current.page() {
                Ok(page) => page,
                Err(FormError::NoForm) => {
                    tracing::info!(%step, "no form left, treating page as terminal");
                    break;
                }
                Err(e) => return Err(structural_without_page(step, e.to_string(), &current)),
            };
            let payload = build_payload(&page, &input).map_err(|e| structural(step, e.to_string(), &page))?;
            current = self.submit(step, &page, &input, &payload)?;
        }

        Ok(current)
    }

    fn page(&self, step: Step, result: &StepResult) -> Result<PageModel, WizardError> {
        result
            .page()
            .map_err(|e| structural_without_page(step, e.to_string(), result))
    }

    fn submit(
        &mut self,
        step: Step,
        page: &PageModel,
        input: &StepInput,
        payload: &Payload,
    ) -> Result<StepResult, WizardError> {
        let carries_submit = page
            .submit_control(&input.submit)
            .is_some_and(|control| payload.contains(&control.name));
        if !carries_submit {
            tracing::warn!(%step, control = %input.submit, "submit control not found, posting without it");
        }
        if page.method != "post" {
            tracing::warn!(%step, method = %page.method, "form does not declare POST");
        }
        tracing::debug!(%step, action = %page.action, keys = ?payload.keys().collect::<Vec<_>>(), "submitting");

        let result = self
            .transport
            .post(&page.action, payload)
            .map_err(|source| WizardError::Transport { step, source })?;
        self.record(step, "POST", &result);
        Ok(result)
    }

    fn record(&mut self, step: Step, method: &str, result: &StepResult) {
        let title = title_of(result);
        tracing::info!(%step, status = result.status, url = %result.url, title = title.as_deref().unwrap_or(""), "step complete");
        self.steps.push(StepRecord {
            step: step.to_string(),
            method: method.to_string(),
            url: result.url.to_string(),
            status: result.status,
            title,
        });
    }
}

fn structural(step: Step, reason: impl Into<String>, page: &PageModel) -> WizardError {
    WizardError::Structural {
        step,
        reason: reason.into(),
        page_title: page.title.clone(),
    }
}

fn structural_without_page(step: Step, reason: String, result: &StepResult) -> WizardError {
    WizardError::Structural {
        step,
        reason,
        page_title: title_of(result),
    }
}

fn title_of(result: &StepResult) -> Option<String> {
    dom::parse_html(&result.body).title()
}
