//! Working copy of the form under edit, kept in a JSON key/value file that
//! plays the role of browser local storage.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use leadform_spec::{Automation, FormBuilderSession, FormDefinition, FormElement, FormStatus};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PersistError;

pub const DEFAULT_TITLE: &str = "Untitled form";

/// Keys written to the storage file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    FormElements,
    FormTitle,
    FormId,
    FormAutomations,
    SavedAt,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::FormElements => "formElements",
            StorageKey::FormTitle => "formTitle",
            StorageKey::FormId => "formId",
            StorageKey::FormAutomations => "formAutomations",
            StorageKey::SavedAt => "formSavedAt",
        }
    }
}

/// Raw contents of the mirror.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MirrorSnapshot {
    pub form_id: Option<String>,
    pub title: Option<String>,
    pub elements: Vec<FormElement>,
    pub automations: Vec<Automation>,
    pub saved_at: Option<String>,
}

impl MirrorSnapshot {
    pub fn into_session(self) -> Result<FormBuilderSession, PersistError> {
        let definition = FormDefinition {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            elements: self.elements,
            automations: self.automations,
            status: FormStatus::Draft,
        };
        Ok(FormBuilderSession::from_definition(self.form_id, definition)?)
    }
}

#[derive(Debug, Clone)]
pub struct ElementMirror {
    path: PathBuf,
}

/// Advisory lock on a file next to the storage file. The kernel drops it when
/// the holder exits, so a killed writer never leaves the mirror locked.
struct LockGuard {
    file: File,
}

impl LockGuard {
    fn acquire(path: PathBuf) -> Result<Self, PersistError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|err| PersistError::io(&path, err))?;
        match file.try_lock() {
            Ok(()) => Ok(Self { file }),
            Err(TryLockError::WouldBlock) => Err(PersistError::Busy(path)),
            Err(TryLockError::Error(err)) => Err(PersistError::io(path, err)),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!(%err, "failed to release storage lock");
        }
    }
}

impl ElementMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn lock_path(&self) -> PathBuf {
        self.storage_dir().join("formElements.lock")
    }

    /// Reads the mirror. A missing file yields an empty snapshot.
    pub fn read(&self) -> Result<MirrorSnapshot, PersistError> {
        let map = self.read_map()?;
        let take = |key: StorageKey| map.get(key.as_str()).filter(|value| !value.is_null());

        let elements = match take(StorageKey::FormElements) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let automations = match take(StorageKey::FormAutomations) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let text = |key: StorageKey| take(key).and_then(Value::as_str).map(str::to_string);

        Ok(MirrorSnapshot {
            form_id: text(StorageKey::FormId),
            title: text(StorageKey::FormTitle),
            elements,
            automations,
            saved_at: text(StorageKey::SavedAt),
        })
    }

    /// Restores the session stored in the mirror, or `None` when nothing was
    /// stored yet.
    pub fn load(&self) -> Result<Option<FormBuilderSession>, PersistError> {
        if !self.exists() {
            return Ok(None);
        }
        let snapshot = self.read()?;
        tracing::debug!(
            path = %self.path.display(),
            elements = snapshot.elements.len(),
            "restored working copy"
        );
        snapshot.into_session().map(Some)
    }

    /// Writes the session when it has unsaved changes and clears its dirty
    /// flag. Returns whether anything was written.
    pub fn flush(&self, session: &mut FormBuilderSession) -> Result<bool, PersistError> {
        if !session.is_dirty() {
            return Ok(false);
        }
        self.save(session)?;
        session.clear_dirty();
        Ok(true)
    }

    /// Unconditionally writes the session.
    pub fn save(&self, session: &FormBuilderSession) -> Result<(), PersistError> {
        let dir = self.storage_dir();
        fs::create_dir_all(&dir).map_err(|err| PersistError::io(&dir, err))?;
        let _lock = LockGuard::acquire(self.lock_path())?;

        let mut map = self.read_map()?;
        let mut put = |key: StorageKey, value: Value| {
            map.insert(key.as_str().to_string(), value);
        };
        put(
            StorageKey::FormElements,
            serde_json::to_value(session.elements())?,
        );
        put(StorageKey::FormTitle, Value::from(session.title()));
        put(
            StorageKey::FormId,
            session.form_id().map_or(Value::Null, Value::from),
        );
        put(
            StorageKey::FormAutomations,
            serde_json::to_value(session.automations())?,
        );
        if let Ok(now) = OffsetDateTime::now_utc().format(&Rfc3339) {
            put(StorageKey::SavedAt, Value::from(now));
        }

        self.write_map(&dir, &map)?;
        tracing::debug!(path = %self.path.display(), elements = session.elements().len(), "working copy written");
        Ok(())
    }

    /// Removes the stored working copy.
    pub fn clear(&self) -> Result<(), PersistError> {
        if !self.exists() {
            return Ok(());
        }
        let _lock = LockGuard::acquire(self.lock_path())?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistError::io(&self.path, err)),
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>, PersistError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(PersistError::io(&self.path, err)),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    fn storage_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    // Temp file in the same directory so the final rename stays atomic.
    fn write_map(&self, dir: &Path, map: &Map<String, Value>) -> Result<(), PersistError> {
        let mut file = NamedTempFile::new_in(dir).map_err(|err| PersistError::io(dir, err))?;
        serde_json::to_writer_pretty(&mut file, map)?;
        file.write_all(b"\n")
            .map_err(|err| PersistError::io(file.path(), err))?;
        file.persist(&self.path)
            .map_err(|err| PersistError::io(&self.path, err.error))?;
        Ok(())
    }
}
