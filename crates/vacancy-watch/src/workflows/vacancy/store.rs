use super::catalog::PropertyCatalog;
use super::domain::{PropertyId, Status, StatusRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Durable last-known status per property.
///
/// `load` never fails: losing history degrades to "nothing seen yet" rather than aborting
/// the run. Only `save` reports errors.
pub trait StatusStore: Send + Sync {
    /// Returns the stored record with a defaulted entry for every catalog property
    /// that has none.
    fn load(&self, catalog: &PropertyCatalog) -> StatusRecord;
    fn save(&self, record: &StatusRecord) -> Result<(), PersistenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write status file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode status record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("status store unavailable: {0}")]
    Unavailable(String),
}

/// JSON object of `{ "property name": "status" }`, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStatusStore {
    path: PathBuf,
}

impl JsonFileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Option<BTreeMap<PropertyId, Status>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no status file yet");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "status file unreadable, starting fresh");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Some(entries),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "status file corrupt, starting fresh");
                None
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "status.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StatusStore for JsonFileStatusStore {
    fn load(&self, catalog: &PropertyCatalog) -> StatusRecord {
        let entries = self.read_entries().unwrap_or_default();
        with_catalog_defaults(StatusRecord::from_entries(entries), catalog)
    }

    fn save(&self, record: &StatusRecord) -> Result<(), PersistenceError> {
        let write_error = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        let mut content = serde_json::to_string_pretty(record.entries())?;
        content.push('\n');

        // write-then-rename so a crash never leaves a half-written record
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(write_error)?;
        fs::rename(&temp_path, &self.path).map_err(write_error)?;

        debug!(path = %self.path.display(), entries = record.len(), "status record saved");
        Ok(())
    }
}

/// Process-local store used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    entries: Mutex<Option<BTreeMap<PropertyId, Status>>>,
    fail_saves: bool,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: BTreeMap<PropertyId, Status>) -> Self {
        Self {
            entries: Mutex::new(Some(entries)),
            fail_saves: false,
        }
    }

    /// A store whose every save fails, for exercising the fatal path.
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(None),
            fail_saves: true,
        }
    }

    pub fn snapshot(&self) -> Option<BTreeMap<PropertyId, Status>> {
        self.entries
            .lock()
            .expect("status store mutex poisoned")
            .clone()
    }
}

impl StatusStore for MemoryStatusStore {
    fn load(&self, catalog: &PropertyCatalog) -> StatusRecord {
        let entries = self.snapshot().unwrap_or_default();
        with_catalog_defaults(StatusRecord::from_entries(entries), catalog)
    }

    fn save(&self, record: &StatusRecord) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Unavailable(
                "memory store configured to fail".to_string(),
            ));
        }
        let mut guard = self.entries.lock().expect("status store mutex poisoned");
        *guard = Some(record.entries().clone());
        Ok(())
    }
}

fn with_catalog_defaults(mut record: StatusRecord, catalog: &PropertyCatalog) -> StatusRecord {
    for property in catalog.iter() {
        record.register_default(property.id.clone());
    }
    record
}
