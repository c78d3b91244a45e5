use serde::Serialize;
use serde_json::{Value, json};

use crate::session::FormBuilderSession;
use crate::spec::element::{ClientField, ElementType, FormElement};
use crate::validate::validate_values;
use crate::values::{FieldValue, FormValues, format_number};
use crate::visibility::resolve_visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    /// Every visible field passes and no required field is blank.
    Complete,
    Incomplete,
}

impl PreviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewStatus::Complete => "complete",
            PreviewStatus::Incomplete => "incomplete",
        }
    }
}

/// One entered sub-field of a Client Details section.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewSubField {
    pub key: String,
    pub label: String,
    pub value: Option<FieldValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewRow {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub title: String,
    pub required: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub missing: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<PreviewSubField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewPayload {
    pub title: String,
    pub status: PreviewStatus,
    pub visible: usize,
    pub total: usize,
    pub rows: Vec<PreviewRow>,
}

pub fn build_preview(session: &FormBuilderSession) -> PreviewPayload {
    build_preview_for(session.title(), session.elements(), session.values())
}

pub fn build_preview_for(title: &str, elements: &[FormElement], values: &FormValues) -> PreviewPayload {
    let visibility = resolve_visibility(elements, values);
    let report = validate_values(elements, values);

    let rows = elements
        .iter()
        .map(|element| PreviewRow {
            id: element.id.clone(),
            element_type: element.element_type(),
            title: element.title.clone(),
            required: element.required,
            visible: visibility.get(&element.id).copied().unwrap_or(true),
            value: values.get(&element.id).cloned(),
            error: report.error_for(&element.id).map(str::to_string),
            missing: report.missing_required.contains(&element.id),
            sub_fields: sub_fields(element, values),
        })
        .collect::<Vec<_>>();

    let status = if report.is_clean() {
        PreviewStatus::Complete
    } else {
        PreviewStatus::Incomplete
    };

    PreviewPayload {
        title: title.to_string(),
        status,
        visible: rows.iter().filter(|row| row.visible).count(),
        total: rows.len(),
        rows,
    }
}

fn sub_fields(element: &FormElement, values: &FormValues) -> Vec<PreviewSubField> {
    let Some(fields) = element.client_fields() else {
        return Vec::new();
    };
    let mut labels = ClientField::ALL
        .into_iter()
        .filter(|field| fields.is_enabled(*field))
        .map(|field| field.key().to_string())
        .collect::<Vec<_>>();
    labels.extend(fields.custom.iter().cloned());

    fields
        .value_keys(&element.id)
        .into_iter()
        .zip(labels)
        .map(|(key, label)| PreviewSubField {
            value: values.get(&key).cloned(),
            key,
            label,
        })
        .collect()
}

pub fn render_json(payload: &PreviewPayload) -> Value {
    json!({
        "title": payload.title,
        "status": payload.status.as_str(),
        "progress": {
            "visible": payload.visible,
            "total": payload.total,
        },
        "elements": payload.rows,
    })
}

/// Human-readable preview listing only the visible elements.
pub fn render_text(payload: &PreviewPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.title));
    lines.push(format!(
        "Status: {} ({}/{} visible)",
        payload.status.as_str(),
        payload.visible,
        payload.total
    ));

    for row in payload.rows.iter().filter(|row| row.visible) {
        let marker = if row.required { "*" } else { "" };
        if row.element_type == ElementType::TextBlock {
            lines.push(format!("- [{}] {}", row.element_type, row.title));
            continue;
        }
        lines.push(format!(
            "- [{}] {}{}: {}",
            row.element_type,
            row.title,
            marker,
            display_value(row.value.as_ref())
        ));
        for sub in &row.sub_fields {
            lines.push(format!(
                "    {}: {}",
                sub.label,
                display_value(sub.value.as_ref())
            ));
        }
        if let Some(error) = &row.error {
            lines.push(format!("    ! {error}"));
        }
        if row.missing {
            lines.push("    ! This field is required".to_string());
        }
    }

    lines.join("\n")
}

fn display_value(value: Option<&FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => "(empty)".into(),
        Some(FieldValue::Text(text)) if text.is_empty() => "(empty)".into(),
        Some(FieldValue::Text(text)) => text.clone(),
        Some(FieldValue::List(items)) if items.is_empty() => "(none)".into(),
        Some(FieldValue::List(items)) => items.join(", "),
        Some(FieldValue::Number(number)) => format_number(*number),
        Some(FieldValue::Bool(flag)) => if *flag { "yes" } else { "no" }.into(),
    }
}
