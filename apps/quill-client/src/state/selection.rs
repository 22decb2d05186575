//! # Selection Store
//!
//! Durable storage for the selected client id.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where the Selection Lives                            │
//! │                                                                         │
//! │  1. QUILL_STATE_PATH (highest priority)                                │
//! │                                                                         │
//! │  2. Platform data directory                                            │
//! │     ~/.local/share/quill-invoicing/state.toml (Linux)                  │
//! │     ~/Library/Application Support/com.quill.invoicing/state.toml (macOS)│
//! │                                                                         │
//! │  File contents:                                                        │
//! │     selectedClientId = 4                                               │
//! │                                                                         │
//! │  Cleared selection = key removed from the file                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures never break the session: [`ClientsState`] logs them and
//! carries on with the in-memory selection.
//!
//! [`ClientsState`]: super::ClientsState

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use quill_core::ClientId;

/// File name used inside the platform data directory.
const STATE_FILE: &str = "state.toml";

/// Selection store errors.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Selection file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Selection file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Selection could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("No data directory available for the selection file")]
    NoDataDir,
}

/// Key-value persistence for the `selectedClientId` key.
pub trait SelectionStore: Send + Sync {
    /// Reads the persisted id, if any.
    fn load(&self) -> Result<Option<ClientId>, SelectionError>;

    /// Persists `id` as the selection.
    fn save(&self, id: ClientId) -> Result<(), SelectionError>;

    /// Removes the persisted selection.
    fn clear(&self) -> Result<(), SelectionError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    #[serde(
        rename = "selectedClientId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    selected_client_id: Option<ClientId>,
}

// =============================================================================
// File Store
// =============================================================================

/// TOML-file-backed selection store.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSelectionStore { path: path.into() }
    }

    /// Uses `override_path` when given, else the platform data directory.
    pub fn locate(override_path: Option<&Path>) -> Result<Self, SelectionError> {
        let path = match override_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().ok_or(SelectionError::NoDataDir)?,
        };
        debug!(?path, "Selection file located");
        Ok(Self::new(path))
    }

    /// Returns the default selection file path.
    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "quill", "invoicing")
            .map(|dirs| dirs.data_dir().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<SelectionFile, SelectionError> {
        if !self.path.exists() {
            return Ok(SelectionFile::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn write(&self, file: &SelectionFile) -> Result<(), SelectionError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(file)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SelectionStore for FileSelectionStore {
    fn load(&self) -> Result<Option<ClientId>, SelectionError> {
        Ok(self.read()?.selected_client_id)
    }

    fn save(&self, id: ClientId) -> Result<(), SelectionError> {
        let mut file = self.read().unwrap_or_default();
        file.selected_client_id = Some(id);
        self.write(&file)?;
        info!(path = ?self.path, client_id = id, "Selection saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut file = self.read().unwrap_or_default();
        file.selected_client_id = None;
        self.write(&file)?;
        info!(path = ?self.path, "Selection cleared");
        Ok(())
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    value: Mutex<Option<ClientId>>,
}

impl MemorySelectionStore {
    pub fn new(initial: Option<ClientId>) -> Self {
        MemorySelectionStore {
            value: Mutex::new(initial),
        }
    }

    /// Current stored value.
    pub fn get(&self) -> Option<ClientId> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load(&self) -> Result<Option<ClientId>, SelectionError> {
        Ok(self.get())
    }

    fn save(&self, id: ClientId) -> Result<(), SelectionError> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner()) = Some(id);
        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionError> {
        *self.value.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}
