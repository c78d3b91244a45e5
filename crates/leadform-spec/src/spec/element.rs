use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::condition::{Condition, ShowWhen};

/// Closed set of element type tags shown in the builder palette.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum ElementType {
    #[serde(rename = "Text Block")]
    TextBlock,
    #[serde(rename = "Single Response")]
    SingleResponse,
    #[serde(rename = "Long Answer")]
    LongAnswer,
    #[serde(rename = "Short Answer")]
    ShortAnswer,
    #[serde(rename = "Phone Number")]
    PhoneNumber,
    Number,
    Date,
    Rating,
    Dropdown,
    #[serde(rename = "Radio Buttons")]
    RadioButtons,
    Checkboxes,
    #[serde(rename = "File Upload")]
    FileUpload,
    #[serde(rename = "Client Details")]
    ClientDetails,
    Email,
    #[serde(rename = "URL")]
    Url,
}

impl ElementType {
    pub const ALL: [ElementType; 15] = [
        ElementType::TextBlock,
        ElementType::SingleResponse,
        ElementType::LongAnswer,
        ElementType::ShortAnswer,
        ElementType::PhoneNumber,
        ElementType::Number,
        ElementType::Date,
        ElementType::Rating,
        ElementType::Dropdown,
        ElementType::RadioButtons,
        ElementType::Checkboxes,
        ElementType::FileUpload,
        ElementType::ClientDetails,
        ElementType::Email,
        ElementType::Url,
    ];

    /// Wire tag, identical to the palette label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::TextBlock => "Text Block",
            ElementType::SingleResponse => "Single Response",
            ElementType::LongAnswer => "Long Answer",
            ElementType::ShortAnswer => "Short Answer",
            ElementType::PhoneNumber => "Phone Number",
            ElementType::Number => "Number",
            ElementType::Date => "Date",
            ElementType::Rating => "Rating",
            ElementType::Dropdown => "Dropdown",
            ElementType::RadioButtons => "Radio Buttons",
            ElementType::Checkboxes => "Checkboxes",
            ElementType::FileUpload => "File Upload",
            ElementType::ClientDetails => "Client Details",
            ElementType::Email => "Email",
            ElementType::Url => "URL",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            ElementType::Dropdown | ElementType::RadioButtons | ElementType::Checkboxes
        )
    }

    /// Structural blocks that never hold a value.
    pub fn is_static(&self) -> bool {
        matches!(self, ElementType::TextBlock)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_tag(value);
        Self::ALL
            .into_iter()
            .find(|ty| normalize_tag(ty.as_str()) == wanted)
            .ok_or_else(|| format!("unknown element type '{value}'"))
    }
}

fn normalize_tag(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Rule set checked by the validation evaluator. The element type decides which
/// subset is meaningful: text-like types use the length and pattern rules,
/// `Number` uses the range rules.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.pattern.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TextSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct NumberSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceSettings {
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetailsSettings {
    #[serde(default)]
    pub client_fields: ClientFields,
}

/// Toggleable contact fields of the `Client Details` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    Email,
    Name,
    Phone,
    Address,
    Company,
}

impl ClientField {
    pub const ALL: [ClientField; 5] = [
        ClientField::Email,
        ClientField::Name,
        ClientField::Phone,
        ClientField::Address,
        ClientField::Company,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ClientField::Email => "email",
            ClientField::Name => "name",
            ClientField::Phone => "phone",
            ClientField::Address => "address",
            ClientField::Company => "company",
        }
    }
}

impl FromStr for ClientField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.key() == wanted)
            .ok_or_else(|| format!("unknown client field '{value}'"))
    }
}

/// Contact sub-fields collected by the `Client Details` section. `email` is
/// always collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ClientFields {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default)]
    pub name: bool,
    #[serde(default)]
    pub phone: bool,
    #[serde(default)]
    pub address: bool,
    #[serde(default)]
    pub company: bool,
    #[serde(default)]
    pub custom: Vec<String>,
}

fn enabled() -> bool {
    true
}

impl Default for ClientFields {
    fn default() -> Self {
        Self {
            email: true,
            name: true,
            phone: true,
            address: false,
            company: false,
            custom: Vec::new(),
        }
    }
}

impl ClientFields {
    pub fn is_enabled(&self, field: ClientField) -> bool {
        match field {
            ClientField::Email => true,
            ClientField::Name => self.name,
            ClientField::Phone => self.phone,
            ClientField::Address => self.address,
            ClientField::Company => self.company,
        }
    }

    pub(crate) fn set(&mut self, field: ClientField, enabled: bool) {
        match field {
            ClientField::Email => self.email = true,
            ClientField::Name => self.name = enabled,
            ClientField::Phone => self.phone = enabled,
            ClientField::Address => self.address = enabled,
            ClientField::Company => self.company = enabled,
        }
    }

    /// Value keys of the enabled sub-fields for the section with id `element_id`.
    pub fn value_keys(&self, element_id: &str) -> Vec<String> {
        let mut keys = ClientField::ALL
            .into_iter()
            .filter(|field| self.is_enabled(*field))
            .map(|field| client_value_key(element_id, field))
            .collect::<Vec<_>>();
        keys.extend(
            (0..self.custom.len()).map(|index| format!("{element_id}-custom-{index}")),
        );
        keys
    }
}

/// Key under which a Client Details sub-field value is stored in `FormValues`.
pub fn client_value_key(element_id: &str, field: ClientField) -> String {
    format!("{element_id}-{}", field.key())
}

/// Type-specific payload of a form element, tagged by the wire `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ElementKind {
    #[serde(rename = "Text Block")]
    TextBlock,
    #[serde(rename = "Single Response")]
    SingleResponse(TextSettings),
    #[serde(rename = "Long Answer")]
    LongAnswer(TextSettings),
    #[serde(rename = "Short Answer")]
    ShortAnswer(TextSettings),
    #[serde(rename = "Phone Number")]
    PhoneNumber(TextSettings),
    Number(NumberSettings),
    Date,
    Rating,
    Dropdown(ChoiceSettings),
    #[serde(rename = "Radio Buttons")]
    RadioButtons(ChoiceSettings),
    Checkboxes(ChoiceSettings),
    #[serde(rename = "File Upload")]
    FileUpload,
    #[serde(rename = "Client Details")]
    ClientDetails(ClientDetailsSettings),
    Email(TextSettings),
    #[serde(rename = "URL")]
    Url(TextSettings),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::TextBlock => ElementType::TextBlock,
            ElementKind::SingleResponse(_) => ElementType::SingleResponse,
            ElementKind::LongAnswer(_) => ElementType::LongAnswer,
            ElementKind::ShortAnswer(_) => ElementType::ShortAnswer,
            ElementKind::PhoneNumber(_) => ElementType::PhoneNumber,
            ElementKind::Number(_) => ElementType::Number,
            ElementKind::Date => ElementType::Date,
            ElementKind::Rating => ElementType::Rating,
            ElementKind::Dropdown(_) => ElementType::Dropdown,
            ElementKind::RadioButtons(_) => ElementType::RadioButtons,
            ElementKind::Checkboxes(_) => ElementType::Checkboxes,
            ElementKind::FileUpload => ElementType::FileUpload,
            ElementKind::ClientDetails(_) => ElementType::ClientDetails,
            ElementKind::Email(_) => ElementType::Email,
            ElementKind::Url(_) => ElementType::Url,
        }
    }
}

/// One form field or structural block.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub show_when: ShowWhen,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl FormElement {
    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            ElementKind::Dropdown(settings)
            | ElementKind::RadioButtons(settings)
            | ElementKind::Checkboxes(settings) => Some(&settings.options),
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.kind {
            ElementKind::Dropdown(settings)
            | ElementKind::RadioButtons(settings)
            | ElementKind::Checkboxes(settings) => Some(&mut settings.options),
            _ => None,
        }
    }

    pub fn validation(&self) -> Option<&ValidationRules> {
        match &self.kind {
            ElementKind::SingleResponse(settings)
            | ElementKind::LongAnswer(settings)
            | ElementKind::ShortAnswer(settings)
            | ElementKind::PhoneNumber(settings)
            | ElementKind::Email(settings)
            | ElementKind::Url(settings) => settings.validation.as_ref(),
            ElementKind::Number(settings) => settings.validation.as_ref(),
            _ => None,
        }
    }

    /// Rule slot for types that accept validation; `None` for the others.
    pub fn validation_slot(&mut self) -> Option<&mut Option<ValidationRules>> {
        match &mut self.kind {
            ElementKind::SingleResponse(settings)
            | ElementKind::LongAnswer(settings)
            | ElementKind::ShortAnswer(settings)
            | ElementKind::PhoneNumber(settings)
            | ElementKind::Email(settings)
            | ElementKind::Url(settings) => Some(&mut settings.validation),
            ElementKind::Number(settings) => Some(&mut settings.validation),
            _ => None,
        }
    }

    pub fn client_fields(&self) -> Option<&ClientFields> {
        match &self.kind {
            ElementKind::ClientDetails(settings) => Some(&settings.client_fields),
            _ => None,
        }
    }

    pub fn client_fields_mut(&mut self) -> Option<&mut ClientFields> {
        match &mut self.kind {
            ElementKind::ClientDetails(settings) => Some(&mut settings.client_fields),
            _ => None,
        }
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_parses_loose_spellings() {
        assert_eq!("Short Answer".parse(), Ok(ElementType::ShortAnswer));
        assert_eq!("short-answer".parse(), Ok(ElementType::ShortAnswer));
        assert_eq!("client_details".parse(), Ok(ElementType::ClientDetails));
        assert_eq!("url".parse(), Ok(ElementType::Url));
        assert!("signature".parse::<ElementType>().is_err());
    }

    #[test]
    fn email_cannot_be_disabled() {
        let mut fields = ClientFields::default();
        fields.set(ClientField::Email, false);
        assert!(fields.email);
        assert!(fields.is_enabled(ClientField::Email));
    }

    #[test]
    fn client_value_keys_follow_enabled_fields() {
        let fields = ClientFields {
            email: true,
            name: false,
            phone: true,
            address: false,
            company: false,
            custom: vec!["Budget".into()],
        };
        assert_eq!(
            fields.value_keys("cd"),
            vec!["cd-email", "cd-phone", "cd-custom-0"]
        );
    }
}
