//! Durable text storage used to persist fingerprints between runs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;

/// A single durable text slot.
///
/// A missing slot reads as `Ok(None)`, which callers treat as "nothing
/// stored yet" rather than a failure.
pub trait TextStorage {
    /// Reads the stored text, or `None` if nothing has been written.
    fn read_text(&self) -> Result<Option<String>>;

    /// Replaces the stored text.
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Stores text in a file on disk.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous content intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextStorage for FileStorage {
    fn read_text(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory storage; clones share the same slot.
///
/// # Examples
///
/// ```
/// use slash_commands_db::{MemoryStorage, TextStorage};
///
/// let storage = MemoryStorage::default();
/// let view = storage.clone();
/// storage.write_text("{}").unwrap();
/// assert_eq!(view.read_text().unwrap().as_deref(), Some("{}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Creates storage that already holds `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(text.into()))),
        }
    }
}

impl TextStorage for MemoryStorage {
    fn read_text(&self) -> Result<Option<String>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}
