use crate::outcome::Marker;
use serde::Deserialize;

/// Constants of the target wizard. The defaults describe the live site; the
/// business choices (`office_match`, `calendar_match`) are the usual overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WizardConfig {
    /// Site origin that relative form actions resolve against.
    pub origin: String,
    /// First page of the wizard. Defaults to the origin.
    pub entry_url: Option<String>,
    pub office_field: String,
    /// Case-insensitive substring of the wanted office's option text.
    pub office_match: String,
    pub office_submit: String,
    /// Id (or name) of the calendar select on the second page.
    pub calendar_field: String,
    /// Case-insensitive substring of the wanted appointment class.
    pub calendar_match: String,
    pub calendar_submit: String,
    pub confirm_submit: String,
    /// Number of plain "Next" pages between the calendar and the result.
    pub confirm_steps: usize,
    pub marker: Marker,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            origin: "https://appointment.bmeia.gv.at".to_string(),
            entry_url: None,
            office_field: "Office".to_string(),
            office_match: "KAIRO".to_string(),
            office_submit: "Next".to_string(),
            calendar_field: "CalendarId".to_string(),
            calendar_match: "bachelor".to_string(),
            calendar_submit: "Next".to_string(),
            confirm_submit: "Next".to_string(),
            confirm_steps: 2,
            marker: Marker::default(),
        }
    }
}

impl WizardConfig {
    pub fn entry_url(&self) -> &str {
        self.entry_url.as_deref().unwrap_or(&self.origin)
    }
}
