//! Test harness for search form integration tests.
//!
//! Mounts a `SearchForm` over an in-memory history and a gated preference
//! store whose load resolves only when the test says so, and whose saves are
//! reported over a channel.

use async_trait::async_trait;
use myaku_core::preferences::PreferenceStore;
use myaku_core::{MemoryHistory, OptionValue, SearchForm, SharedQuery, SparseSearchOptions, StorageError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub type LoadResult = Result<SparseSearchOptions, StorageError>;

pub struct GatedStore {
    load_gate: tokio::sync::Mutex<Option<oneshot::Receiver<LoadResult>>>,
    load_calls: AtomicUsize,
    saves: mpsc::UnboundedSender<OptionValue>,
    fail_saves: AtomicBool,
}

impl GatedStore {
    /// Returns the store, the sender that resolves its load, and the
    /// receiver of every save attempt.
    pub fn new() -> (Arc<Self>, oneshot::Sender<LoadResult>, mpsc::UnboundedReceiver<OptionValue>) {
        let (load_tx, load_rx) = oneshot::channel();
        let (save_tx, save_rx) = mpsc::unbounded_channel();
        let store = Arc::new(GatedStore {
            load_gate: tokio::sync::Mutex::new(Some(load_rx)),
            load_calls: AtomicUsize::new(0),
            saves: save_tx,
            fail_saves: AtomicBool::new(false),
        });
        (store, load_tx, save_rx)
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PreferenceStore for GatedStore {
    async fn load(&self) -> LoadResult {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.load_gate.lock().await.take();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(StorageError::Unavailable("load gate dropped".to_string()))),
            None => Ok(SparseSearchOptions::default()),
        }
    }

    async fn save(&self, value: OptionValue) -> Result<(), StorageError> {
        let _ = self.saves.send(value);
        if self.fail_saves.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("save rejected".to_string()))
        } else {
            Ok(())
        }
    }
}

pub struct TestHarness {
    pub form: SearchForm,
    pub history: MemoryHistory,
    pub query: SharedQuery,
    pub store: Arc<GatedStore>,
    release_load: Option<oneshot::Sender<LoadResult>>,
    saves: mpsc::UnboundedReceiver<OptionValue>,
}

impl TestHarness {
    /// Mount a form at `location`. Must be called inside a tokio runtime.
    pub fn mount(location: &str) -> Self {
        let history = MemoryHistory::new(location);
        let query = SharedQuery::default();
        let (store, release_load, saves) = GatedStore::new();
        let form = SearchForm::mount(
            Arc::new(history.clone()),
            store.clone(),
            Arc::new(query.clone()),
        );
        TestHarness {
            form,
            history,
            query,
            store,
            release_load: Some(release_load),
            saves,
        }
    }

    /// Resolve the pending preference load and wait until the form has
    /// processed it.
    pub async fn resolve_load(&mut self, result: LoadResult) {
        if let Some(tx) = self.release_load.take() {
            let _ = tx.send(result);
        }
        if let Some(handle) = self.form.take_preference_load() {
            handle.await.expect("preference load task panicked");
        }
    }

    /// Wait for the next save attempt reaching the store.
    pub async fn next_save(&mut self) -> OptionValue {
        tokio::time::timeout(Duration::from_secs(1), self.saves.recv())
            .await
            .expect("timed out waiting for a save")
            .expect("save channel closed")
    }

    pub fn has_pending_save(&mut self) -> bool {
        self.saves.try_recv().is_ok()
    }
}
