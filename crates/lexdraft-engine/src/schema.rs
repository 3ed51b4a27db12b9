//! Variable schemas
//!
//! A template's fill-in form is described by an ordered list of field
//! descriptors, stored as JSON text on the template row. Descriptors
//! round-trip losslessly, including option forms and conditional rules.
//! Schemas change only through an explicit update; re-extracting a
//! template's variables never regenerates a stored schema.

use serde::{Deserialize, Serialize};

/// Input widget for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Select,
    Date,
}

/// Select options are either bare strings (label doubles as value) or
/// explicit label/value pairs. Both forms survive a round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    Labeled { label: String, value: String },
    Bare(String),
}

impl SelectOption {
    pub fn label(&self) -> &str {
        match self {
            SelectOption::Labeled { label, .. } => label,
            SelectOption::Bare(value) => value,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SelectOption::Labeled { value, .. } => value,
            SelectOption::Bare(value) => value,
        }
    }
}

/// Shows a field only while another field equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowIf {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<ShowIf>,
}

impl FieldDescriptor {
    /// Bare text field with no label, options or visibility rule.
    pub fn new(name: impl Into<String>) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            label: None,
            kind: FieldKind::default(),
            options: Vec::new(),
            show_if: None,
        }
    }
}

/// Starter schema for a freshly scanned template: one text field per
/// variable, labeled from the name.
pub fn scaffold_schema(variables: &[String]) -> Vec<FieldDescriptor> {
    variables
        .iter()
        .map(|name| FieldDescriptor {
            label: Some(derive_label(name)),
            ..FieldDescriptor::new(name.clone())
        })
        .collect()
}

/// `client_name` becomes `Client Name`: underscores turn into spaces and
/// every word start is uppercased. Repeated underscores keep their width.
pub fn derive_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut label = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start {
            label.extend(c.to_uppercase());
        } else {
            label.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    label
}

pub fn to_json(fields: &[FieldDescriptor]) -> serde_json::Result<String> {
    serde_json::to_string(fields)
}

pub fn from_json(json: &str) -> serde_json::Result<Vec<FieldDescriptor>> {
    serde_json::from_str(json)
}
