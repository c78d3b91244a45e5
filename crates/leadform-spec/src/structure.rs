use serde::Serialize;

use crate::spec::element::{ElementType, FormElement};

/// One-click fix offered next to a structural issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "type", rename_all = "snake_case")]
pub enum Remediation {
    AddElement(ElementType),
}

/// Form-level problem that blocks saving but never editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralIssue {
    EmptyForm,
    MissingClientDetails,
}

impl StructuralIssue {
    pub fn code(&self) -> &'static str {
        match self {
            StructuralIssue::EmptyForm => "empty_form",
            StructuralIssue::MissingClientDetails => "missing_client_details",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StructuralIssue::EmptyForm => "Empty Form",
            StructuralIssue::MissingClientDetails => "Missing Client Details",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            StructuralIssue::EmptyForm => "Add at least one element to your form",
            StructuralIssue::MissingClientDetails => {
                "Add a Client Details section so leads can be contacted"
            }
        }
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            StructuralIssue::EmptyForm => Remediation::AddElement(ElementType::ShortAnswer),
            StructuralIssue::MissingClientDetails => {
                Remediation::AddElement(ElementType::ClientDetails)
            }
        }
    }
}

impl std::fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

pub fn check_structure(elements: &[FormElement]) -> Vec<StructuralIssue> {
    let mut issues = Vec::new();
    if elements.is_empty() {
        issues.push(StructuralIssue::EmptyForm);
    }
    if !elements
        .iter()
        .any(|element| element.element_type() == ElementType::ClientDetails)
    {
        issues.push(StructuralIssue::MissingClientDetails);
    }
    issues
}
