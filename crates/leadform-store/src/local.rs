use std::path::{Path, PathBuf};

use async_trait::async_trait;
use leadform_spec::{FormDefinition, FormStatus, FormSummary};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::PersistError;
use crate::repository::FormRepository;

/// [`FormRepository`] over a directory holding one `<id>.json` file per form.
#[derive(Debug, Clone)]
pub struct LocalFormRepository {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredForm {
    id: String,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    #[serde(flatten)]
    definition: FormDefinition,
}

impl LocalFormRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        valid.then(|| self.root.join(format!("{id}.json")))
    }

    async fn read(&self, id: &str) -> Result<StoredForm, PersistError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| PersistError::NotFound(id.to_string()))?;
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound(id.to_string()));
            }
            Err(err) => return Err(PersistError::io(path, err)),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write(&self, id: &str, definition: &FormDefinition) -> Result<(), PersistError> {
        let path = self
            .path_for(id)
            .ok_or_else(|| PersistError::NotFound(id.to_string()))?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| PersistError::io(&self.root, err))?;
        let stored = StoredForm {
            id: id.to_string(),
            updated_at: OffsetDateTime::now_utc(),
            definition: FormDefinition {
                status: FormStatus::Draft,
                ..definition.clone()
            },
        };
        let bytes = serde_json::to_vec_pretty(&stored)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| PersistError::io(path, err))
    }
}

#[async_trait]
impl FormRepository for LocalFormRepository {
    async fn list(&self) -> Result<Vec<FormSummary>, PersistError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PersistError::io(&self.root, err)),
        };

        let mut forms = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| PersistError::io(&self.root, err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let parsed = tokio::fs::read(&path)
                .await
                .map_err(|err| PersistError::io(&path, err))
                .and_then(|raw| Ok(serde_json::from_slice::<StoredForm>(&raw)?));
            match parsed {
                Ok(stored) => forms.push(stored),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping unreadable form"),
            }
        }

        forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(forms
            .into_iter()
            .map(|stored| FormSummary {
                updated_at: stored.updated_at.format(&Rfc3339).ok(),
                id: stored.id,
                title: stored.definition.title,
                status: Some(stored.definition.status),
            })
            .collect())
    }

    async fn fetch(&self, id: &str) -> Result<FormDefinition, PersistError> {
        Ok(self.read(id).await?.definition)
    }

    async fn create(&self, definition: &FormDefinition) -> Result<String, PersistError> {
        let id = Uuid::new_v4().to_string();
        self.write(&id, definition).await?;
        tracing::info!(%id, root = %self.root.display(), "lead form created");
        Ok(id)
    }

    async fn update(&self, id: &str, definition: &FormDefinition) -> Result<(), PersistError> {
        self.read(id).await?;
        self.write(id, definition).await?;
        tracing::info!(%id, "lead form updated");
        Ok(())
    }
}
