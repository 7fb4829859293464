pub mod dom;
pub mod form;
pub mod fetch;
pub mod notify;
pub mod outcome;
pub mod wizard;

pub use form::{build_payload, PageModel};
pub use outcome::{classify, Outcome};
pub use wizard::{run, run_and_notify, RunReport, WizardConfig};

/// Parse an HTML string and return its active form.
/// This is the primary entry point for inspecting a saved wizard page.
pub fn parse(html: &str) -> Result<PageModel, form::FormError> {
    PageModel::parse(html)
}
