use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::spec::element::{ElementType, FormElement};
use crate::spec::form::{Automation, FormDefinition, FormStatus};
use crate::store::{ElementStore, StoreError, StoreEvent};
use crate::structure::{Remediation, StructuralIssue, check_structure};
use crate::validate::{FieldReport, validate_values};
use crate::values::{FieldValue, FormValues, seed_values};
use crate::visibility::{VisibilityMap, resolve_visibility};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("another element is already being edited")]
    EditorBusy,
    #[error("no element is being edited")]
    EditorClosed,
    #[error("values can only be entered in preview mode")]
    NotInPreview,
    #[error("no drag in progress")]
    NoDrag,
    #[error("save blocked: {}", describe(.0))]
    Blocked(Vec<StructuralIssue>),
}

fn describe(issues: &[StructuralIssue]) -> String {
    issues
        .iter()
        .map(StructuralIssue::title)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which builder panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    Elements,
    MyForm,
}

/// Element editor dialog. Edits are staged on a clone and only reach the store
/// on save.
#[derive(Debug, Clone, Default)]
pub enum EditState {
    #[default]
    Closed,
    Open(Box<FormElement>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DragState {
    pub is_dragging: bool,
    pub dragged_element_id: Option<String>,
    pub drag_over_element_id: Option<String>,
}

/// Everything one builder tab works on: the element list plus the transient
/// editing, preview and drag state around it.
#[derive(Debug, Clone)]
pub struct FormBuilderSession {
    form_id: Option<String>,
    title: String,
    store: ElementStore,
    automations: Vec<Automation>,
    active_panel: Panel,
    selected: Option<String>,
    editing: EditState,
    preview: bool,
    values: FormValues,
    drag: DragState,
    structural_issues: Vec<StructuralIssue>,
    dirty: bool,
    changes_saved: bool,
}

impl FormBuilderSession {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_store(None, title.into(), ElementStore::new(), Vec::new())
    }

    pub fn from_definition(
        form_id: Option<String>,
        definition: FormDefinition,
    ) -> Result<Self, SessionError> {
        let store = ElementStore::from_elements(definition.elements)?;
        let pruned = !store.pending_events().is_empty();
        let mut session = Self::with_store(form_id, definition.title, store, definition.automations);
        session.changes_saved = session.form_id.is_some() && !pruned;
        session.dirty = pruned;
        Ok(session)
    }

    fn with_store(
        form_id: Option<String>,
        title: String,
        store: ElementStore,
        automations: Vec<Automation>,
    ) -> Self {
        let structural_issues = check_structure(store.elements());
        Self {
            form_id,
            title,
            store,
            automations,
            active_panel: Panel::default(),
            selected: None,
            editing: EditState::Closed,
            preview: false,
            values: FormValues::new(),
            drag: DragState::default(),
            structural_issues,
            dirty: false,
            changes_saved: false,
        }
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn elements(&self) -> &[FormElement] {
        self.store.elements()
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn automations(&self) -> &[Automation] {
        &self.automations
    }

    pub fn active_panel(&self) -> Panel {
        self.active_panel
    }

    pub fn set_panel(&mut self, panel: Panel) {
        self.active_panel = panel;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: &str) -> Result<(), SessionError> {
        if self.store.get(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()).into());
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn structural_issues(&self) -> &[StructuralIssue] {
        &self.structural_issues
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn changes_saved(&self) -> bool {
        self.changes_saved
    }

    /// Drains store events (pruned or cascaded conditions) since the last call.
    pub fn take_store_events(&mut self) -> Vec<StoreEvent> {
        self.store.take_events()
    }

    /// Adds an element, selects it and switches to the form panel.
    pub fn add_element(&mut self, element_type: ElementType) -> Result<String, SessionError> {
        let id = self.store.add(element_type)?;
        self.selected = Some(id.clone());
        self.active_panel = Panel::MyForm;
        self.after_structural_change();
        Ok(id)
    }

    /// Deletes an element. A stale id is a no-op and yields `None`.
    pub fn delete_element(&mut self, id: &str) -> Result<Option<FormElement>, SessionError> {
        let removed = match self.store.delete(id) {
            Ok(removed) => removed,
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(%id, "delete ignored, element not found");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.editing().is_some_and(|editing| editing.id == id) {
            self.editing = EditState::Closed;
        }
        self.prune_staged_conditions();
        self.after_structural_change();
        Ok(Some(removed))
    }

    /// Duplicates an element. A stale id is a no-op and yields `None`.
    pub fn duplicate_element(&mut self, id: &str) -> Result<Option<String>, SessionError> {
        match self.store.duplicate(id) {
            Ok(copy) => {
                self.after_structural_change();
                Ok(Some(copy))
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(%id, "duplicate ignored, element not found");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn move_up(&mut self, index: usize) -> Result<bool, SessionError> {
        let moved = self.store.move_up(index)?;
        if moved {
            self.prune_staged_conditions();
            self.after_structural_change();
        }
        Ok(moved)
    }

    pub fn move_down(&mut self, index: usize) -> Result<bool, SessionError> {
        let moved = self.store.move_down(index)?;
        if moved {
            self.prune_staged_conditions();
            self.after_structural_change();
        }
        Ok(moved)
    }

    pub fn reorder_by_drag(&mut self, dragged_id: &str, target_id: &str) -> Result<bool, SessionError> {
        let moved = self.store.reorder_by_drag(dragged_id, target_id)?;
        if moved {
            self.prune_staged_conditions();
            self.after_structural_change();
        }
        Ok(moved)
    }

    /// Runs an arbitrary store edit (options, client fields, conditions) and
    /// records it as a change.
    pub fn edit_store<T>(
        &mut self,
        edit: impl FnOnce(&mut ElementStore) -> Result<T, StoreError>,
    ) -> Result<T, SessionError> {
        let result = edit(&mut self.store)?;
        self.after_structural_change();
        Ok(result)
    }

    pub fn begin_drag(&mut self, id: &str) -> Result<(), SessionError> {
        if self.store.get(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()).into());
        }
        self.drag = DragState {
            is_dragging: true,
            dragged_element_id: Some(id.to_string()),
            drag_over_element_id: None,
        };
        Ok(())
    }

    pub fn drag_over(&mut self, id: &str) {
        if self.drag.is_dragging {
            self.drag.drag_over_element_id = Some(id.to_string());
        }
    }

    /// Drops the dragged element onto `target_id` and resets the drag state.
    pub fn drop_on(&mut self, target_id: &str) -> Result<bool, SessionError> {
        let drag = std::mem::take(&mut self.drag);
        let dragged = match drag.dragged_element_id {
            Some(dragged) if drag.is_dragging => dragged,
            _ => return Err(SessionError::NoDrag),
        };
        self.reorder_by_drag(&dragged, target_id)
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::default();
    }

    /// Opens the editor on a clone of the element.
    pub fn open_editor(&mut self, id: &str) -> Result<&mut FormElement, SessionError> {
        if matches!(self.editing, EditState::Open(_)) {
            return Err(SessionError::EditorBusy);
        }
        let element = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.selected = Some(id.to_string());
        self.editing = EditState::Open(Box::new(element));
        self.editing_mut()
    }

    pub fn editing(&self) -> Option<&FormElement> {
        match &self.editing {
            EditState::Open(element) => Some(element.as_ref()),
            EditState::Closed => None,
        }
    }

    pub fn editing_mut(&mut self) -> Result<&mut FormElement, SessionError> {
        match &mut self.editing {
            EditState::Open(element) => Ok(element.as_mut()),
            EditState::Closed => Err(SessionError::EditorClosed),
        }
    }

    /// Discards the staged edit. Returns `false` when nothing was open.
    pub fn cancel_edit(&mut self) -> bool {
        matches!(
            std::mem::take(&mut self.editing),
            EditState::Open(_)
        )
    }

    /// Commits the staged edit into the store. On failure the editor stays open.
    pub fn save_edit(&mut self) -> Result<(), SessionError> {
        let EditState::Open(element) = std::mem::take(&mut self.editing) else {
            return Err(SessionError::EditorClosed);
        };
        if let Err(err) = self.store.replace((*element).clone()) {
            self.editing = EditState::Open(element);
            return Err(err.into());
        }
        self.after_structural_change();
        Ok(())
    }

    /// Enters preview mode with freshly seeded values.
    pub fn enter_preview(&mut self) {
        self.preview = true;
        self.values = seed_values(self.store.elements());
    }

    pub fn exit_preview(&mut self) {
        self.preview = false;
        self.values.clear();
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: FieldValue) -> Result<(), SessionError> {
        if !self.preview {
            return Err(SessionError::NotInPreview);
        }
        self.values.insert(key.into(), value);
        Ok(())
    }

    pub fn visibility(&self) -> VisibilityMap {
        resolve_visibility(self.store.elements(), &self.values)
    }

    pub fn field_errors(&self) -> FieldReport {
        validate_values(self.store.elements(), &self.values)
    }

    pub fn apply_remediation(&mut self, remediation: Remediation) -> Result<String, SessionError> {
        match remediation {
            Remediation::AddElement(element_type) => self.add_element(element_type),
        }
    }

    pub fn to_definition(&self) -> FormDefinition {
        FormDefinition {
            title: self.title.clone(),
            elements: self.store.elements().to_vec(),
            automations: self.automations.clone(),
            status: FormStatus::Draft,
        }
    }

    /// Re-runs the structural checks and returns the definition to send, or
    /// the issues that block saving.
    pub fn prepare_save(&mut self) -> Result<FormDefinition, SessionError> {
        self.structural_issues = check_structure(self.store.elements());
        if !self.structural_issues.is_empty() {
            return Err(SessionError::Blocked(self.structural_issues.clone()));
        }
        Ok(self.to_definition())
    }

    pub fn mark_saved(&mut self, form_id: impl Into<String>) {
        let form_id = form_id.into();
        tracing::info!(%form_id, "form saved");
        self.form_id = Some(form_id);
        self.changes_saved = true;
    }

    // The staged copy may only keep conditions on elements that still precede it.
    fn prune_staged_conditions(&mut self) {
        let EditState::Open(element) = &mut self.editing else {
            return;
        };
        let Some(index) = self.store.position(&element.id) else {
            return;
        };
        let earlier = self.store.elements()[..index]
            .iter()
            .map(|other| other.id.as_str())
            .collect::<BTreeSet<_>>();
        let before = element.conditions.len();
        element
            .conditions
            .retain(|condition| earlier.contains(condition.source_element_id.as_str()));
        let pruned = before - element.conditions.len();
        if pruned > 0 {
            tracing::debug!(id = %element.id, pruned, "dropped staged conditions");
        }
    }

    fn after_structural_change(&mut self) {
        self.structural_issues = check_structure(self.store.elements());
        self.touch();
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.changes_saved = false;
    }
}
