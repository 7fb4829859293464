//! Form synthesis: turns a page model plus the step's choices into the exact
//! urlencoded payload the wizard expects.

use super::{FieldKind, FormError, PageModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Case-insensitive substring predicate over an option's visible text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMatcher {
    contains: String,
}

impl OptionMatcher {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self {
            contains: needle.into(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.contains
    }

    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.contains.to_lowercase())
    }
}

/// What one wizard step submits: select overrides plus the submit control's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInput {
    pub selections: BTreeMap<String, OptionMatcher>,
    pub submit: String,
}

impl StepInput {
    pub fn new(submit: impl Into<String>) -> Self {
        Self {
            selections: BTreeMap::new(),
            submit: submit.into(),
        }
    }

    pub fn select(mut self, field: impl Into<String>, matcher: OptionMatcher) -> Self {
        self.selections.insert(field.into(), matcher);
        self
    }
}

/// Ordered key/value pairs. A repeated key keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payload(Vec<(String, String)>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the submission for `page`:
/// hidden fields verbatim, overridden selects resolved to their first matching
/// option, and the submit control whose value equals `input.submit`. Everything
/// else is left out.
pub fn build_payload(page: &PageModel, input: &StepInput) -> Result<Payload, FormError> {
    for field in input.selections.keys() {
        let present = page
            .fields
            .iter()
            .any(|f| f.kind == FieldKind::Selectable && &f.name == field);
        if !present {
            return Err(FormError::FieldNotFound {
                field: field.clone(),
            });
        }
    }

    let mut payload = Payload::new();
    for field in &page.fields {
        match field.kind {
            FieldKind::Hidden => payload.insert(&field.name, &field.value),
            FieldKind::Selectable => {
                let Some(matcher) = input.selections.get(&field.name) else {
                    continue;
                };
                let option = field
                    .options
                    .iter()
                    .find(|o| matcher.matches(&o.text))
                    .ok_or_else(|| FormError::OptionNotFound {
                        field: field.name.clone(),
                        wanted: matcher.needle().to_string(),
                    })?;
                payload.insert(&field.name, option.payload_value());
            }
            FieldKind::Submit if field.value == input.submit => {
                payload.insert(&field.name, &field.value)
            }
            FieldKind::Submit | FieldKind::Other => {}
        }
    }
    Ok(payload)
}
