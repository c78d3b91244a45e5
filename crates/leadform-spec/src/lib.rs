#![allow(missing_docs)]

pub mod ids;
pub mod registry;
pub mod render;
pub mod schema;
pub mod session;
pub mod spec;
pub mod store;
pub mod structure;
pub mod validate;
pub mod values;
pub mod visibility;

pub use registry::{EditorField, ElementSpec, new_element, palette, spec_for};
pub use render::{PreviewPayload, PreviewStatus, build_preview, build_preview_for, render_json, render_text};
pub use schema::{SchemaError, check_definition_json, definition_schema};
pub use session::{DragState, EditState, FormBuilderSession, Panel, SessionError};
pub use spec::{
    Automation, ClientField, ClientFields, Condition, ConditionOperator, ElementKind, ElementType,
    FormDefinition, FormElement, FormStatus, FormSummary, ShowWhen, ValidationRules,
};
pub use store::{ElementStore, StoreError, StoreEvent};
pub use structure::{Remediation, StructuralIssue, check_structure};
pub use validate::{FieldError, FieldReport, validate, validate_values};
pub use values::{FieldValue, FormValues, seed_values};
pub use visibility::{VisibilityMap, evaluate_condition, resolve_visibility, should_show};
