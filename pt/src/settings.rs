//! Synchronized settings document
//!
//! The whole [`Options`] record is stored as one document together with a
//! revision counter. Writers must name the revision they read; a write
//! against a stale revision is refused so the caller can re-read and retry
//! instead of silently overwriting another client's change.
//!
//! ```text
//! {store_path}/
//! ├── options.json    # {"revision": 7, "options": {"promptTemplatesJson": "...", "theme": "dark"}}
//! └── options.lock    # advisory lock held while checking and replacing options.json
//! ```

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::template::Options;

const DOCUMENT_FILE: &str = "options.json";
const LOCK_FILE: &str = "options.lock";

/// The settings record as of a given revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of successful writes so far; 0 means never written
    pub revision: u64,
    pub options: Options,
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write went through and produced this revision
    Written(u64),
    /// Someone else wrote first; the document is at `current`
    Conflict { current: u64 },
}

/// Key-value settings storage shared between clients
pub trait SettingsBackend {
    /// Read the current document, or defaults at revision 0 if none exists
    fn read(&self) -> Result<Snapshot>;

    /// Replace the document only if it is still at `expected` revision
    fn write_if(&self, expected: u64, options: &Options) -> Result<WriteOutcome>;
}

/// In-process backend, used by tests and embedders
pub struct MemoryBackend {
    state: Mutex<Snapshot>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_defaults(Options::default())
    }

    pub fn with_defaults(defaults: Options) -> Self {
        Self {
            state: Mutex::new(Snapshot {
                revision: 0,
                options: defaults,
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self) -> Result<Snapshot> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.clone())
    }

    fn write_if(&self, expected: u64, options: &Options) -> Result<WriteOutcome> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.revision != expected {
            return Ok(WriteOutcome::Conflict {
                current: state.revision,
            });
        }
        state.revision += 1;
        state.options = options.clone();
        Ok(WriteOutcome::Written(state.revision))
    }
}

/// Backend that keeps the document in a JSON file shared by every process of the user
pub struct FileBackend {
    base_path: PathBuf,
    defaults: Options,
}

impl FileBackend {
    /// Open or create a settings directory at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_defaults(path, Options::default())
    }

    /// Like [`FileBackend::open`], with the record to report before the first write
    pub fn open_with_defaults(path: impl AsRef<Path>, defaults: Options) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened settings directory");
        Ok(Self { base_path, defaults })
    }

    pub fn document_path(&self) -> PathBuf {
        self.base_path.join(DOCUMENT_FILE)
    }

    fn read_document(&self) -> Result<Snapshot> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(Snapshot {
                revision: 0,
                options: self.defaults.clone(),
            });
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))
    }
}

impl SettingsBackend for FileBackend {
    fn read(&self) -> Result<Snapshot> {
        self.read_document()
    }

    fn write_if(&self, expected: u64, options: &Options) -> Result<WriteOutcome> {
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(LOCK_FILE))?;
        FileExt::lock_exclusive(&lock)?;

        let current = self.read_document()?.revision;
        if current != expected {
            warn!(expected, current, "Settings document changed since it was read");
            FileExt::unlock(&lock)?;
            return Ok(WriteOutcome::Conflict { current });
        }

        let snapshot = Snapshot {
            revision: current + 1,
            options: options.clone(),
        };
        // Readers never take the lock, so the document is swapped in with a rename
        let tmp_path = self.base_path.join(format!("{}.tmp", DOCUMENT_FILE));
        fs::write(&tmp_path, serde_json::to_string_pretty(&snapshot)?)?;
        fs::rename(&tmp_path, self.document_path())?;
        FileExt::unlock(&lock)?;

        debug!(revision = snapshot.revision, "Wrote settings document");
        Ok(WriteOutcome::Written(snapshot.revision))
    }
}
