//! Run outcomes and the terminal-page classifier.
//!
//! The wizard never states that appointments exist. It only shows an error
//! block when none do, so classification is a heuristic:
//!
//! 1. marker present, text equals the expected sentence: [`Outcome::NoSlots`]
//! 2. marker present, any other text: [`Outcome::PossibleSlots`] with that text
//! 3. marker absent: [`Outcome::PossibleSlots`] with an empty detail
//!
//! Case 3 may also mean the wizard returned a different page than expected.
//! Both escalating cases stay distinguishable through the detail.

use crate::dom::{self, DomNode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The single result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    NoSlots,
    PossibleSlots {
        detail: String,
    },
    StructuralFailure {
        step: String,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        page_title: Option<String>,
    },
    TransportFailure {
        step: String,
        reason: String,
    },
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::NoSlots => "no_slots",
            Outcome::PossibleSlots { .. } => "possible_slots",
            Outcome::StructuralFailure { .. } => "structural_failure",
            Outcome::TransportFailure { .. } => "transport_failure",
        }
    }

    /// Human-readable detail handed to the notifier.
    pub fn detail(&self) -> String {
        match self {
            Outcome::NoSlots => String::new(),
            Outcome::PossibleSlots { detail } => detail.clone(),
            Outcome::StructuralFailure {
                step,
                reason,
                page_title,
            } => match page_title {
                Some(title) => format!("{reason} (step: {step}, page: {title:?})"),
                None => format!("{reason} (step: {step})"),
            },
            Outcome::TransportFailure { step, reason } => format!("{reason} (step: {step})"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::StructuralFailure { .. } | Outcome::TransportFailure { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoSlots => write!(f, "no appointments available"),
            Outcome::PossibleSlots { detail } if detail.is_empty() => {
                write!(f, "appointments may be available")
            }
            Outcome::PossibleSlots { detail } => {
                write!(f, "appointments may be available: {detail}")
            }
            Outcome::StructuralFailure { .. } => write!(f, "wizard changed: {}", self.detail()),
            Outcome::TransportFailure { .. } => write!(f, "request failed: {}", self.detail()),
        }
    }
}

/// Where the "no appointments" block lives and what it says.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Marker {
    /// Class token of the error block.
    pub class: String,
    /// Exact sentence, after whitespace normalisation, meaning "no slots".
    pub no_slots_text: String,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            class: "message-error".to_string(),
            no_slots_text: "For your selection there are unfortunately no appointments available"
                .to_string(),
        }
    }
}

/// Classify a terminal page body.
pub fn classify(html: &str, marker: &Marker) -> Outcome {
    classify_dom(&dom::parse_html(html), marker)
}

pub fn classify_dom(root: &DomNode, marker: &Marker) -> Outcome {
    let block = root.find_first(&|n| n.node_type == dom::NodeType::Element && n.has_class(&marker.class));
    match block.map(|n| n.text_content()) {
        Some(text) if text == normalize(&marker.no_slots_text) => Outcome::NoSlots,
        Some(text) => Outcome::PossibleSlots { detail: text },
        None => Outcome::PossibleSlots {
            detail: String::new(),
        },
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
