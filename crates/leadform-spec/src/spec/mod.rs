pub mod condition;
pub mod element;
pub mod form;

pub use condition::{Condition, ConditionOperator, ShowWhen};
pub use element::{
    ChoiceSettings, ClientDetailsSettings, ClientField, ClientFields, ElementKind, ElementType,
    FormElement, NumberSettings, TextSettings, ValidationRules, client_value_key,
};
pub use form::{Automation, FormDefinition, FormStatus, FormSummary};
