//! Persisted search option preferences.
//!
//! - [`PreferenceStore`] — async load/save capability injected into the form
//! - [`MemoryPreferenceStore`] — in-process store, switchable to unavailable
//! - [`FilePreferenceStore`] — JSON file in the `session-search-options` wire format
//! - [`PreferenceSync`] — fire-and-forget saves and the one-shot load

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::options::{OptionValue, SparseSearchOptions};

/// Storage for a user's remembered search options. The store is shared
/// across sessions and the form never assumes exclusive access to it.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load every remembered option; keys never saved come back unset.
    async fn load(&self) -> Result<SparseSearchOptions, StorageError>;

    /// Remember one option value, replacing any earlier value for its key.
    async fn save(&self, value: OptionValue) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

pub struct MemoryPreferenceStore {
    stored: Mutex<SparseSearchOptions>,
    available: AtomicBool,
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new(SparseSearchOptions::default())
    }
}

impl MemoryPreferenceStore {
    pub fn new(stored: SparseSearchOptions) -> Self {
        Self {
            stored: Mutex::new(stored),
            available: AtomicBool::new(true),
        }
    }

    /// Make every subsequent load and save fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> SparseSearchOptions {
        *self.stored.lock()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<SparseSearchOptions, StorageError> {
        self.check_available()?;
        Ok(self.snapshot())
    }

    async fn save(&self, value: OptionValue) -> Result<(), StorageError> {
        self.check_available()?;
        self.stored.lock().set(value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Preferences kept as a single JSON object on disk. A missing file reads as
/// "nothing remembered"; an unrecognised value reads as unset and is dropped
/// by the next save. Only a file that is not a JSON object is an error.
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SparseSearchOptions, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(SparseSearchOptions::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SparseSearchOptions::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> Result<SparseSearchOptions, StorageError> {
        self.read().await
    }

    async fn save(&self, value: OptionValue) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.read().await?;
        stored.set(value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Runs store operations in the background so the form never waits on them.
///
/// Operations are spawned on the current tokio runtime. Outside a runtime
/// preference sync is disabled and the form runs on location and defaults only.
#[derive(Clone)]
pub struct PreferenceSync {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceSync {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Persist one accepted option change. Failures are logged and dropped.
    pub fn save(&self, value: OptionValue) -> Option<JoinHandle<()>> {
        let handle = runtime("save")?;
        let store = Arc::clone(&self.store);
        Some(handle.spawn(async move {
            match store.save(value).await {
                Ok(()) => debug!(key = %value.key(), value = %value, "Saved search option preference"),
                Err(e) => warn!(key = %value.key(), error = %e, "Failed to save search option preference"),
            }
        }))
    }

    /// Load remembered options and hand them to `on_loaded`. On failure
    /// `on_loaded` is never called.
    pub fn load<F>(&self, on_loaded: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(SparseSearchOptions) + Send + 'static,
    {
        let handle = runtime("load")?;
        let store = Arc::clone(&self.store);
        Some(handle.spawn(async move {
            match store.load().await {
                Ok(loaded) => on_loaded(loaded),
                Err(e) => warn!(error = %e, "Failed to load search option preferences"),
            }
        }))
    }
}

fn runtime(operation: &str) -> Option<Handle> {
    match Handle::try_current() {
        Ok(h) => Some(h),
        Err(_) => {
            warn!(operation, "No async runtime available, skipping preference sync");
            None
        }
    }
}
