use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::element::FormElement;

/// Publication state sent with a saved form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
}

/// Automation attached to a form. Carried through unchanged; the builder never
/// evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Automation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub config: Value,
}

/// Serialized form definition exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub title: String,
    #[serde(default)]
    pub elements: Vec<FormElement>,
    #[serde(default)]
    pub automations: Vec<Automation>,
    #[serde(default)]
    pub status: FormStatus,
}

impl FormDefinition {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
            automations: Vec::new(),
            status: FormStatus::Draft,
        }
    }
}

/// Row returned by the form listing.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<FormStatus>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
