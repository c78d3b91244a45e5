#![allow(dead_code)]

use leadform_spec::{FormDefinition, FormElement};

pub fn fixture() -> FormDefinition {
    serde_json::from_str(include_str!("../fixtures/lead_form.json")).expect("fixture should deserialize")
}

pub fn element(definition: &FormDefinition, id: &str) -> FormElement {
    definition
        .elements
        .iter()
        .find(|element| element.id == id)
        .cloned()
        .unwrap_or_else(|| panic!("fixture element {id}"))
}
