use serde_json::Value;
use thiserror::Error;

use crate::spec::form::FormDefinition;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("form definition schema is invalid: {0}")]
    Schema(String),
    #[error("form definition does not match the schema: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("failed to decode form definition: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON schema describing a serialized [`FormDefinition`].
pub fn definition_schema() -> Value {
    schemars::schema_for!(FormDefinition).to_value()
}

/// Validates raw JSON against [`definition_schema`] before decoding it.
pub fn check_definition_json(raw: &Value) -> Result<FormDefinition, SchemaError> {
    let schema = definition_schema();
    let validator =
        jsonschema::validator_for(&schema).map_err(|err| SchemaError::Schema(err.to_string()))?;

    let problems = validator
        .iter_errors(raw)
        .map(|err| {
            let path = err.instance_path().to_string();
            if path.is_empty() {
                err.to_string()
            } else {
                format!("{path}: {err}")
            }
        })
        .collect::<Vec<_>>();
    if !problems.is_empty() {
        return Err(SchemaError::Invalid(problems));
    }

    Ok(serde_json::from_value(raw.clone())?)
}
