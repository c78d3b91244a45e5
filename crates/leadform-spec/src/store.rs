use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::ids::new_id;
use crate::registry;
use crate::spec::condition::{Condition, ConditionOperator, ShowWhen};
use crate::spec::element::{ClientField, ElementType, FormElement};

/// Errors raised by element store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("element '{0}' not found")]
    NotFound(String),
    #[error("duplicate element id '{0}'")]
    DuplicateId(String),
    #[error("index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the form already has a Client Details section")]
    DuplicateClientDetails,
    #[error("element '{0}' has no options")]
    NotAChoiceElement(String),
    #[error("element '{0}' must keep at least one option")]
    LastOption(String),
    #[error("option {index} does not exist on element '{element_id}'")]
    OptionOutOfRange { element_id: String, index: usize },
    #[error("element '{0}' is not a Client Details section")]
    NotClientDetails(String),
    #[error("the email field of Client Details is always collected")]
    ImmutableClientField,
    #[error("custom field {index} does not exist on element '{element_id}'")]
    CustomFieldOutOfRange { element_id: String, index: usize },
    #[error("condition source '{source_id}' must come before element '{owner_id}'")]
    ForwardReference { owner_id: String, source_id: String },
    #[error("condition '{condition_id}' not found on element '{element_id}'")]
    ConditionNotFound {
        element_id: String,
        condition_id: String,
    },
}

/// Side effects of a mutation that callers may want to surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A reorder moved a condition's source to or after its owner.
    ConditionPruned {
        owner_id: String,
        condition_id: String,
        source_element_id: String,
    },
    /// A delete removed conditions that referenced the deleted element.
    ConditionsCascaded { deleted_id: String, removed: usize },
}

/// Ordered collection of form elements.
///
/// After every mutation the `order` of each element equals its index.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<FormElement>,
    events: Vec<StoreEvent>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a persisted element list. Elements are sorted by their stored
    /// `order`, renumbered, and `clientFields.email` is forced on. Conditions
    /// whose source does not come earlier are pruned and reported as events.
    pub fn from_elements(mut elements: Vec<FormElement>) -> Result<Self, StoreError> {
        let mut seen = BTreeSet::new();
        for element in &elements {
            if !seen.insert(element.id.clone()) {
                return Err(StoreError::DuplicateId(element.id.clone()));
            }
        }
        let client_details = elements
            .iter()
            .filter(|element| element.element_type() == ElementType::ClientDetails)
            .count();
        if client_details > 1 {
            return Err(StoreError::DuplicateClientDetails);
        }
        elements.sort_by_key(|element| element.order);
        for element in &mut elements {
            if let Some(fields) = element.client_fields_mut() {
                fields.email = true;
            }
        }
        let mut store = Self {
            elements,
            events: Vec::new(),
        };
        store.after_reorder();
        Ok(store)
    }

    pub fn elements(&self) -> &[FormElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<FormElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FormElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|element| element.id == id)
    }

    pub fn has_client_details(&self) -> bool {
        self.elements
            .iter()
            .any(|element| element.element_type() == ElementType::ClientDetails)
    }

    pub fn pending_events(&self) -> &[StoreEvent] {
        &self.events
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Appends a new element with registry defaults and returns its id.
    pub fn add(&mut self, element_type: ElementType) -> Result<String, StoreError> {
        if element_type == ElementType::ClientDetails && self.has_client_details() {
            return Err(StoreError::DuplicateClientDetails);
        }
        let id = new_id();
        let element = registry::new_element(element_type, id.clone(), self.elements.len());
        self.elements.push(element);
        tracing::debug!(%id, kind = %element_type, "element added");
        Ok(id)
    }

    /// Removes an element and strips every condition that used it as a source.
    pub fn delete(&mut self, id: &str) -> Result<FormElement, StoreError> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);

        let mut cascaded = 0;
        for element in &mut self.elements {
            let before = element.conditions.len();
            element
                .conditions
                .retain(|condition| condition.source_element_id != id);
            cascaded += before - element.conditions.len();
        }
        if cascaded > 0 {
            self.events.push(StoreEvent::ConditionsCascaded {
                deleted_id: id.to_string(),
                removed: cascaded,
            });
        }

        self.renumber();
        tracing::debug!(%id, cascaded, "element deleted");
        Ok(removed)
    }

    /// Appends a copy of an element under a new id. Conditions are not copied.
    pub fn duplicate(&mut self, id: &str) -> Result<String, StoreError> {
        let source = self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if source.element_type() == ElementType::ClientDetails {
            return Err(StoreError::DuplicateClientDetails);
        }

        let mut copy = source.clone();
        copy.id = new_id();
        copy.title = format!("{} (Copy)", source.title);
        copy.order = self.elements.len();
        copy.conditions.clear();
        copy.show_when = ShowWhen::All;

        let copy_id = copy.id.clone();
        self.elements.push(copy);
        tracing::debug!(source = %id, copy = %copy_id, "element duplicated");
        Ok(copy_id)
    }

    /// Swaps the element at `index` with its predecessor. Returns `false` at
    /// the top boundary.
    pub fn move_up(&mut self, index: usize) -> Result<bool, StoreError> {
        self.check_index(index)?;
        if index == 0 {
            return Ok(false);
        }
        self.elements.swap(index, index - 1);
        self.after_reorder();
        Ok(true)
    }

    /// Swaps the element at `index` with its successor. Returns `false` at the
    /// bottom boundary.
    pub fn move_down(&mut self, index: usize) -> Result<bool, StoreError> {
        self.check_index(index)?;
        if index + 1 == self.elements.len() {
            return Ok(false);
        }
        self.elements.swap(index, index + 1);
        self.after_reorder();
        Ok(true)
    }

    /// Moves `dragged_id` so that it sits immediately before `target_id`.
    /// Dropping an element onto itself changes nothing.
    pub fn reorder_by_drag(&mut self, dragged_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let from = self.index_of(dragged_id)?;
        self.index_of(target_id)?;
        if dragged_id == target_id {
            return Ok(false);
        }

        let dragged = self.elements.remove(from);
        let to = self
            .position(target_id)
            .ok_or_else(|| StoreError::NotFound(target_id.to_string()))?;
        self.elements.insert(to, dragged);
        self.after_reorder();
        tracing::debug!(dragged = %dragged_id, target = %target_id, from, to, "element dragged");
        Ok(true)
    }

    /// Replaces the stored element carrying the same id, keeping its position.
    pub fn replace(&mut self, mut element: FormElement) -> Result<(), StoreError> {
        let index = self.index_of(&element.id)?;

        if let Some(options) = element.options()
            && options.is_empty()
        {
            return Err(StoreError::LastOption(element.id.clone()));
        }
        if element.element_type() == ElementType::ClientDetails
            && self.elements.iter().enumerate().any(|(position, other)| {
                position != index && other.element_type() == ElementType::ClientDetails
            })
        {
            return Err(StoreError::DuplicateClientDetails);
        }
        for condition in &element.conditions {
            match self.position(&condition.source_element_id) {
                Some(source) if source < index => {}
                _ => {
                    return Err(StoreError::ForwardReference {
                        owner_id: element.id.clone(),
                        source_id: condition.source_element_id.clone(),
                    });
                }
            }
        }
        if let Some(fields) = element.client_fields_mut() {
            fields.email = true;
        }

        element.order = index;
        self.elements[index] = element;
        Ok(())
    }

    pub fn add_option(&mut self, id: &str, label: impl Into<String>) -> Result<usize, StoreError> {
        let options = self.options_mut(id)?;
        options.push(label.into());
        Ok(options.len() - 1)
    }

    pub fn update_option(
        &mut self,
        id: &str,
        index: usize,
        label: impl Into<String>,
    ) -> Result<(), StoreError> {
        let options = self.options_mut(id)?;
        let slot = options
            .get_mut(index)
            .ok_or_else(|| StoreError::OptionOutOfRange {
                element_id: id.to_string(),
                index,
            })?;
        *slot = label.into();
        Ok(())
    }

    /// Removes an option. The last remaining option cannot be removed.
    pub fn remove_option(&mut self, id: &str, index: usize) -> Result<String, StoreError> {
        let options = self.options_mut(id)?;
        if index >= options.len() {
            return Err(StoreError::OptionOutOfRange {
                element_id: id.to_string(),
                index,
            });
        }
        if options.len() == 1 {
            return Err(StoreError::LastOption(id.to_string()));
        }
        Ok(options.remove(index))
    }

    pub fn move_option(&mut self, id: &str, index: usize, up: bool) -> Result<bool, StoreError> {
        let options = self.options_mut(id)?;
        if index >= options.len() {
            return Err(StoreError::OptionOutOfRange {
                element_id: id.to_string(),
                index,
            });
        }
        let other = match (up, index) {
            (true, 0) => return Ok(false),
            (true, _) => index - 1,
            (false, _) if index + 1 == options.len() => return Ok(false),
            (false, _) => index + 1,
        };
        options.swap(index, other);
        Ok(true)
    }

    pub fn set_client_field(
        &mut self,
        id: &str,
        field: ClientField,
        enabled: bool,
    ) -> Result<(), StoreError> {
        if field == ClientField::Email {
            return Err(StoreError::ImmutableClientField);
        }
        let element = self.get_mut(id)?;
        let fields = element
            .client_fields_mut()
            .ok_or_else(|| StoreError::NotClientDetails(id.to_string()))?;
        fields.set(field, enabled);
        Ok(())
    }

    pub fn add_custom_client_field(
        &mut self,
        id: &str,
        label: impl Into<String>,
    ) -> Result<usize, StoreError> {
        let element = self.get_mut(id)?;
        let fields = element
            .client_fields_mut()
            .ok_or_else(|| StoreError::NotClientDetails(id.to_string()))?;
        fields.custom.push(label.into());
        Ok(fields.custom.len() - 1)
    }

    pub fn remove_custom_client_field(&mut self, id: &str, index: usize) -> Result<String, StoreError> {
        let element = self.get_mut(id)?;
        let fields = element
            .client_fields_mut()
            .ok_or_else(|| StoreError::NotClientDetails(id.to_string()))?;
        if index >= fields.custom.len() {
            return Err(StoreError::CustomFieldOutOfRange {
                element_id: id.to_string(),
                index,
            });
        }
        Ok(fields.custom.remove(index))
    }

    /// Elements that a condition on `owner_id` may reference: every element
    /// placed before it, except static text blocks.
    pub fn condition_sources(&self, owner_id: &str) -> Result<Vec<&FormElement>, StoreError> {
        let index = self.index_of(owner_id)?;
        Ok(self.elements[..index]
            .iter()
            .filter(|element| !element.element_type().is_static())
            .collect())
    }

    pub fn add_condition(
        &mut self,
        owner_id: &str,
        source_id: &str,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Result<String, StoreError> {
        let owner = self.index_of(owner_id)?;
        let source = self.index_of(source_id)?;
        if source >= owner || self.elements[source].element_type().is_static() {
            return Err(StoreError::ForwardReference {
                owner_id: owner_id.to_string(),
                source_id: source_id.to_string(),
            });
        }

        let condition = Condition {
            id: new_id(),
            source_element_id: source_id.to_string(),
            operator,
            value: value.into(),
        };
        let condition_id = condition.id.clone();
        self.elements[owner].conditions.push(condition);
        Ok(condition_id)
    }

    pub fn remove_condition(
        &mut self,
        owner_id: &str,
        condition_id: &str,
    ) -> Result<Condition, StoreError> {
        let owner = self.get_mut(owner_id)?;
        let index = owner
            .conditions
            .iter()
            .position(|condition| condition.id == condition_id)
            .ok_or_else(|| StoreError::ConditionNotFound {
                element_id: owner_id.to_string(),
                condition_id: condition_id.to_string(),
            })?;
        Ok(owner.conditions.remove(index))
    }

    pub fn set_show_when(&mut self, owner_id: &str, show_when: ShowWhen) -> Result<(), StoreError> {
        self.get_mut(owner_id)?.show_when = show_when;
        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut FormElement, StoreError> {
        self.elements
            .iter_mut()
            .find(|element| element.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn options_mut(&mut self, id: &str) -> Result<&mut Vec<String>, StoreError> {
        self.get_mut(id)?
            .options_mut()
            .ok_or_else(|| StoreError::NotAChoiceElement(id.to_string()))
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index >= self.elements.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.elements.len(),
            });
        }
        Ok(())
    }

    fn after_reorder(&mut self) {
        self.renumber();
        self.prune_forward_conditions();
    }

    fn renumber(&mut self) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.order = index;
        }
    }

    // Conditions may only look at earlier elements; a reorder can break that.
    fn prune_forward_conditions(&mut self) {
        for index in 0..self.elements.len() {
            let earlier = self.elements[..index]
                .iter()
                .map(|element| element.id.clone())
                .collect::<BTreeSet<_>>();
            let owner = &mut self.elements[index];
            let owner_id = owner.id.clone();
            let mut pruned = Vec::new();
            owner.conditions.retain(|condition| {
                let keep = earlier.contains(&condition.source_element_id);
                if !keep {
                    pruned.push(StoreEvent::ConditionPruned {
                        owner_id: owner_id.clone(),
                        condition_id: condition.id.clone(),
                        source_element_id: condition.source_element_id.clone(),
                    });
                }
                keep
            });
            for event in &pruned {
                tracing::warn!(?event, "condition source no longer precedes its element");
            }
            self.events.extend(pruned);
        }
    }
}
