//! Page model: the active form of a wizard page, reduced to what replaying it needs.

mod payload;

pub use payload::{build_payload, OptionMatcher, Payload, StepInput};

use crate::dom::{self, DomNode, NodeType};
use serde::Serialize;

/// How a field participates in the replayed submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Hidden,
    Selectable,
    Submit,
    Other,
}

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Visible text with its original case.
    pub text: String,
    /// The `value` attribute, empty when absent.
    pub value: String,
}

impl SelectOption {
    pub fn new(value: &str, text: &str) -> Self {
        Self {
            text: text.to_string(),
            value: value.to_string(),
        }
    }

    /// The value the wizard expects for this option. Some options only carry
    /// their token in the visible text, so an empty value falls back to it.
    pub fn payload_value(&self) -> &str {
        if self.value.is_empty() {
            self.text.trim()
        } else {
            &self.value
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: FieldKind,
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl Field {
    /// Matches either the `id` or the `name` attribute.
    pub fn is_identified_by(&self, ident: &str) -> bool {
        self.name == ident || self.id.as_deref() == Some(ident)
    }
}

/// The first `<form>` of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageModel {
    /// Raw `action` attribute; resolved against the site origin by the transport.
    pub action: String,
    /// Lowercased `method`, `get` when absent.
    pub method: String,
    /// Named fields in document order.
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("no <form> element on page")]
    NoForm,
    #[error("field {field:?} not found in form")]
    FieldNotFound { field: String },
    #[error("no option of {field:?} matches {wanted:?}")]
    OptionNotFound { field: String, wanted: String },
}

impl PageModel {
    /// Parse an HTML document and extract its active form.
    pub fn parse(html: &str) -> Result<Self, FormError> {
        Self::from_dom(&dom::parse_html(html))
    }

    pub fn from_dom(root: &DomNode) -> Result<Self, FormError> {
        let form = root
            .find_first(&|n| n.is_element("form"))
            .ok_or(FormError::NoForm)?;

        let mut fields = Vec::new();
        collect_fields(form, &mut fields);

        Ok(Self {
            action: form.get_attr("action").unwrap_or("").trim().to_string(),
            method: form
                .get_attr("method")
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "get".to_string()),
            fields,
            title: root.title(),
        })
    }

    /// First field carrying `ident` as its id or name.
    pub fn field(&self, ident: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_identified_by(ident))
    }

    pub fn hidden_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Hidden)
    }

    /// The submit control whose value is `label`, if the form has one.
    pub fn submit_control(&self, label: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.kind == FieldKind::Submit && f.value == label)
    }
}

fn collect_fields(node: &DomNode, out: &mut Vec<Field>) {
    for child in &node.children {
        if child.node_type != NodeType::Element {
            continue;
        }
        match child.tag.as_str() {
            "input" | "button" | "select" | "textarea" => {
                if let Some(field) = field_from_node(child) {
                    out.push(field);
                }
            }
            // Nested forms are invalid HTML; their controls belong to them, not us.
            "form" => {}
            _ => collect_fields(child, out),
        }
    }
}

fn field_from_node(node: &DomNode) -> Option<Field> {
    let name = node.get_attr("name").map(str::trim).filter(|n| !n.is_empty())?;
    let id = node.get_attr("id").map(|s| s.to_string());
    let attr_value = node.get_attr("value").unwrap_or("").to_string();

    let (kind, value, options) = match node.tag.as_str() {
        "input" => {
            let input_type = node
                .get_attr("type")
                .map(|t| t.trim().to_lowercase())
                .unwrap_or_default();
            let kind = match input_type.as_str() {
                "hidden" => FieldKind::Hidden,
                "submit" => FieldKind::Submit,
                _ => FieldKind::Other,
            };
            (kind, attr_value, Vec::new())
        }
        "button" => {
            let is_submit = node
                .get_attr("type")
                .map(|t| t.trim().eq_ignore_ascii_case("submit"))
                .unwrap_or(true);
            let kind = if is_submit { FieldKind::Submit } else { FieldKind::Other };
            // A valueless <button> is identified by its label.
            let value = if node.get_attr("value").is_some() {
                attr_value
            } else {
                node.text_content()
            };
            (kind, value, Vec::new())
        }
        "select" => {
            let mut selected = None;
            let options: Vec<SelectOption> = node
                .find_all(&|n| n.is_element("option"))
                .into_iter()
                .map(|opt| {
                    let option = SelectOption::new(opt.get_attr("value").unwrap_or(""), &opt.text_content());
                    if selected.is_none() && opt.get_attr("selected").is_some() {
                        selected = Some(option.payload_value().to_string());
                    }
                    option
                })
                .collect();
            let value = selected
                .or_else(|| options.first().map(|o| o.payload_value().to_string()))
                .unwrap_or_default();
            (FieldKind::Selectable, value, options)
        }
        _ => (FieldKind::Other, node.text_content(), Vec::new()),
    };

    Some(Field {
        name: name.to_string(),
        id,
        kind,
        value,
        options,
    })
}
