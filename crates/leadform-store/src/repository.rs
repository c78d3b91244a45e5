use async_trait::async_trait;
use leadform_spec::{FormDefinition, FormSummary};

use crate::error::PersistError;

/// Backend that stores saved lead forms.
///
/// `create` and `update` always persist the form as a draft.
#[async_trait]
pub trait FormRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<FormSummary>, PersistError>;

    async fn fetch(&self, id: &str) -> Result<FormDefinition, PersistError>;

    /// Stores a new form and returns the id assigned by the backend.
    async fn create(&self, definition: &FormDefinition) -> Result<String, PersistError>;

    async fn update(&self, id: &str, definition: &FormDefinition) -> Result<(), PersistError>;
}
