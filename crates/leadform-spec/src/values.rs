use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::element::{ElementType, FormElement};

/// Value entered for one field while filling in a preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

/// Entered values keyed by element id (or Client Details sub-key).
pub type FormValues = BTreeMap<String, FieldValue>;

impl FieldValue {
    /// String form used by the condition operators: `null` becomes `""`, lists
    /// are comma-joined and integral numbers print without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Number(value) => format_number(*value),
            FieldValue::Text(value) => value.clone(),
            FieldValue::List(items) => items.join(","),
        }
    }

    /// True for `null`, `""` and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(value) => value.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Formats a number the way it is shown to form users.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        // Exponent form below 1e-6 and from 1e21 up, with an explicit sign.
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    if value.fract() == 0.0 && magnitude < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Fresh preview values: `defaultValue` when present, otherwise `[]` for
/// checkboxes, `0` for ratings and `""` for everything else.
pub fn seed_values(elements: &[FormElement]) -> FormValues {
    let mut values = FormValues::new();
    for element in elements {
        let seeded = match (&element.default_value, element.element_type()) {
            (Some(default), _) => FieldValue::Text(default.clone()),
            (None, ElementType::Checkboxes) => FieldValue::List(Vec::new()),
            (None, ElementType::Rating) => FieldValue::Number(0.0),
            (None, _) => FieldValue::Text(String::new()),
        };
        values.insert(element.id.clone(), seeded);

        if let Some(fields) = element.client_fields() {
            for key in fields.value_keys(&element.id) {
                values.insert(key, FieldValue::Text(String::new()));
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_form_labels() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-8), "-2.5e-8");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn text_coercion_covers_every_variant() {
        assert_eq!(FieldValue::Null.to_text(), "");
        assert_eq!(FieldValue::Bool(true).to_text(), "true");
        assert_eq!(FieldValue::Number(7.0).to_text(), "7");
        assert_eq!(
            FieldValue::List(vec!["a".into(), "b".into()]).to_text(),
            "a,b"
        );
    }

    #[test]
    fn untagged_values_deserialize_from_plain_json() {
        let values: FormValues =
            serde_json::from_str(r#"{"a":"yes","b":3,"c":["x"],"d":null,"e":false}"#)
                .expect("values");
        assert_eq!(values["a"], FieldValue::Text("yes".into()));
        assert_eq!(values["b"], FieldValue::Number(3.0));
        assert_eq!(values["c"], FieldValue::List(vec!["x".into()]));
        assert_eq!(values["d"], FieldValue::Null);
        assert_eq!(values["e"], FieldValue::Bool(false));
    }
}
