use regex::Regex;
use serde::Serialize;

use crate::spec::element::FormElement;
use crate::values::{FieldValue, FormValues, format_number};
use crate::visibility::resolve_visibility;

/// Checks `value` against the element's validation rules and returns the first
/// failing rule's message.
///
/// Strings are checked for minimum length, maximum length and then pattern;
/// numbers for minimum and then maximum. Other value types are never rejected.
pub fn validate(element: &FormElement, value: &FieldValue) -> Option<String> {
    let rules = element.validation()?;

    match value {
        FieldValue::Text(text) => {
            let length = text.chars().count();
            if let Some(min_length) = rules.min_length
                && length < min_length
            {
                return Some(format!("Minimum length is {min_length} characters"));
            }
            if let Some(max_length) = rules.max_length
                && length > max_length
            {
                return Some(format!("Maximum length is {max_length} characters"));
            }
            if let Some(pattern) = rules.pattern.as_deref()
                && !pattern.is_empty()
                && !pattern_matches(&element.id, pattern, text)
            {
                return Some("Input doesn't match the required format".into());
            }
            None
        }
        FieldValue::Number(number) => {
            if let Some(min) = rules.min
                && *number < min
            {
                return Some(format!("Minimum value is {}", format_number(min)));
            }
            if let Some(max) = rules.max
                && *number > max
            {
                return Some(format!("Maximum value is {}", format_number(max)));
            }
            None
        }
        FieldValue::Null | FieldValue::Bool(_) | FieldValue::List(_) => None,
    }
}

fn pattern_matches(element_id: &str, pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(text),
        Err(err) => {
            tracing::warn!(element = element_id, %err, "skipping invalid validation pattern");
            true
        }
    }
}

/// Inline error for one visible field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub element_id: String,
    pub message: String,
}

/// Summary of per-field checks over the visible elements of a preview.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FieldReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
}

impl FieldReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.missing_required.is_empty()
    }

    pub fn error_for(&self, element_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.element_id == element_id)
            .map(|error| error.message.as_str())
    }
}

/// Runs [`validate`] over every visible element and lists visible required
/// fields that are still blank. Hidden elements are skipped entirely.
pub fn validate_values(elements: &[FormElement], values: &FormValues) -> FieldReport {
    let visibility = resolve_visibility(elements, values);
    let mut report = FieldReport::default();

    for element in elements {
        if element.element_type().is_static() {
            continue;
        }
        if !visibility.get(&element.id).copied().unwrap_or(true) {
            continue;
        }

        match values.get(&element.id) {
            Some(value) if !value.is_blank() => {
                if let Some(message) = validate(element, value) {
                    report.errors.push(FieldError {
                        element_id: element.id.clone(),
                        message,
                    });
                }
            }
            _ => {
                if element.required && !client_details_filled(element, values) {
                    report.missing_required.push(element.id.clone());
                }
            }
        }
    }

    report
}

// A Client Details section stores its input under sub-keys; it counts as
// answered once every enabled sub-field has a value.
fn client_details_filled(element: &FormElement, values: &FormValues) -> bool {
    let Some(fields) = element.client_fields() else {
        return false;
    };
    fields.value_keys(&element.id).iter().all(|key| {
        values
            .get(key)
            .is_some_and(|value| !value.is_blank())
    })
}
