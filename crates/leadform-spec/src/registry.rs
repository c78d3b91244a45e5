use serde::Serialize;

use crate::spec::condition::ShowWhen;
use crate::spec::element::{
    ChoiceSettings, ClientDetailsSettings, ClientFields, ElementKind, ElementType, FormElement,
    NumberSettings, TextSettings,
};

/// Editor inputs offered for an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorField {
    Title,
    Description,
    Required,
    Placeholder,
    DefaultValue,
    Options,
    LengthRules,
    PatternRule,
    RangeRules,
    ClientFields,
    Conditions,
}

/// Palette entry for one element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpec {
    pub element_type: ElementType,
    pub icon: &'static str,
    pub summary: &'static str,
    pub editor_fields: &'static [EditorField],
}

impl ElementSpec {
    pub fn label(&self) -> &'static str {
        self.element_type.as_str()
    }

    pub fn supports(&self, field: EditorField) -> bool {
        self.editor_fields.contains(&field)
    }
}

const TEXT_FIELDS: &[EditorField] = &[
    EditorField::Title,
    EditorField::Description,
    EditorField::Required,
    EditorField::Placeholder,
    EditorField::DefaultValue,
    EditorField::LengthRules,
    EditorField::PatternRule,
    EditorField::Conditions,
];

const CHOICE_FIELDS: &[EditorField] = &[
    EditorField::Title,
    EditorField::Description,
    EditorField::Required,
    EditorField::DefaultValue,
    EditorField::Options,
    EditorField::Conditions,
];

const PLAIN_FIELDS: &[EditorField] = &[
    EditorField::Title,
    EditorField::Description,
    EditorField::Required,
    EditorField::Conditions,
];

const SPECS: [ElementSpec; 15] = [
    ElementSpec {
        element_type: ElementType::TextBlock,
        icon: "type",
        summary: "Static heading and paragraph",
        editor_fields: &[
            EditorField::Title,
            EditorField::Description,
            EditorField::Conditions,
        ],
    },
    ElementSpec {
        element_type: ElementType::SingleResponse,
        icon: "text-cursor",
        summary: "One-line free text answer",
        editor_fields: TEXT_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::LongAnswer,
        icon: "align-left",
        summary: "Multi-line free text answer",
        editor_fields: TEXT_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::ShortAnswer,
        icon: "minus",
        summary: "Short free text answer",
        editor_fields: TEXT_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::PhoneNumber,
        icon: "phone",
        summary: "Phone number input",
        editor_fields: TEXT_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::Number,
        icon: "hash",
        summary: "Numeric input with optional range",
        editor_fields: &[
            EditorField::Title,
            EditorField::Description,
            EditorField::Required,
            EditorField::Placeholder,
            EditorField::DefaultValue,
            EditorField::RangeRules,
            EditorField::Conditions,
        ],
    },
    ElementSpec {
        element_type: ElementType::Date,
        icon: "calendar",
        summary: "Date picker",
        editor_fields: PLAIN_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::Rating,
        icon: "star",
        summary: "Star rating",
        editor_fields: PLAIN_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::Dropdown,
        icon: "chevron-down",
        summary: "Pick one option from a list",
        editor_fields: CHOICE_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::RadioButtons,
        icon: "circle-dot",
        summary: "Pick one visible option",
        editor_fields: CHOICE_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::Checkboxes,
        icon: "check-square",
        summary: "Pick any number of options",
        editor_fields: CHOICE_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::FileUpload,
        icon: "upload",
        summary: "File attachment",
        editor_fields: PLAIN_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::ClientDetails,
        icon: "user",
        summary: "Contact details of the lead",
        editor_fields: &[
            EditorField::Title,
            EditorField::Description,
            EditorField::Required,
            EditorField::ClientFields,
        ],
    },
    ElementSpec {
        element_type: ElementType::Email,
        icon: "mail",
        summary: "Email address input",
        editor_fields: TEXT_FIELDS,
    },
    ElementSpec {
        element_type: ElementType::Url,
        icon: "link",
        summary: "Web address input",
        editor_fields: TEXT_FIELDS,
    },
];

pub fn palette() -> &'static [ElementSpec] {
    &SPECS
}

pub fn spec_for(element_type: ElementType) -> &'static ElementSpec {
    SPECS
        .iter()
        .find(|spec| spec.element_type == element_type)
        .unwrap_or(&SPECS[0])
}

/// Default type-specific payload for a freshly added element.
pub fn default_kind(element_type: ElementType) -> ElementKind {
    let text = TextSettings::default;
    let choices = || ChoiceSettings {
        options: vec!["Option 1".into(), "Option 2".into(), "Option 3".into()],
    };
    match element_type {
        ElementType::TextBlock => ElementKind::TextBlock,
        ElementType::SingleResponse => ElementKind::SingleResponse(text()),
        ElementType::LongAnswer => ElementKind::LongAnswer(text()),
        ElementType::ShortAnswer => ElementKind::ShortAnswer(text()),
        ElementType::PhoneNumber => ElementKind::PhoneNumber(text()),
        ElementType::Number => ElementKind::Number(NumberSettings::default()),
        ElementType::Date => ElementKind::Date,
        ElementType::Rating => ElementKind::Rating,
        ElementType::Dropdown => ElementKind::Dropdown(choices()),
        ElementType::RadioButtons => ElementKind::RadioButtons(choices()),
        ElementType::Checkboxes => ElementKind::Checkboxes(choices()),
        ElementType::FileUpload => ElementKind::FileUpload,
        ElementType::ClientDetails => ElementKind::ClientDetails(ClientDetailsSettings {
            client_fields: ClientFields::default(),
        }),
        ElementType::Email => ElementKind::Email(text()),
        ElementType::Url => ElementKind::Url(text()),
    }
}

fn default_placeholder(element_type: ElementType) -> Option<&'static str> {
    match element_type {
        ElementType::SingleResponse | ElementType::ShortAnswer => Some("Your answer"),
        ElementType::LongAnswer => Some("Type your answer here..."),
        ElementType::PhoneNumber => Some("+1 (555) 000-0000"),
        ElementType::Number => Some("0"),
        ElementType::Email => Some("name@example.com"),
        ElementType::Url => Some("https://"),
        _ => None,
    }
}

/// Builds a new element of `element_type` with registry defaults.
pub fn new_element(element_type: ElementType, id: String, order: usize) -> FormElement {
    let description = match element_type {
        ElementType::TextBlock => Some("Add your text here".to_string()),
        ElementType::ClientDetails => Some("Please provide your contact information".to_string()),
        _ => None,
    };
    FormElement {
        id,
        title: spec_for(element_type).label().to_string(),
        description,
        required: false,
        order,
        placeholder: default_placeholder(element_type).map(str::to_string),
        default_value: None,
        conditions: Vec::new(),
        show_when: ShowWhen::All,
        kind: default_kind(element_type),
    }
}
