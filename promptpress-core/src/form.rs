//! Settings form controller
//!
//! Holds a local draft of the settings snapshot, submits it as one atomic
//! update through a [`SettingsEndpoint`], and exposes the transient
//! `saving`/`saved` flags the surrounding UI renders. After a successful
//! save the `saving` flag stays up for two seconds and is then cleared by a
//! single deferred task; tearing the form down aborts that task so nothing
//! fires against a dead form.

use crate::config::{SettingsError, SettingsSnapshot, SettingsStore, KEY, URL};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long the saved acknowledgment keeps the saving indicator up
const SAVED_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Boundary to the settings persistence endpoint
#[async_trait]
pub trait SettingsEndpoint: Send + Sync {
    /// Persist the full snapshot atomically, returning the acknowledged state
    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<SettingsSnapshot, SettingsError>;
}

/// Endpoint that writes straight into a shared settings store
///
/// Stands in for the remote admin endpoint when the store lives in-process;
/// the acknowledgment it returns reflects post-sanitization values.
#[derive(Debug, Clone)]
pub struct StoreEndpoint {
    store: Arc<Mutex<SettingsStore>>,
}

impl StoreEndpoint {
    /// Wrap a shared settings store
    pub fn new(store: Arc<Mutex<SettingsStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsEndpoint for StoreEndpoint {
    async fn save(&self, snapshot: &SettingsSnapshot) -> Result<SettingsSnapshot, SettingsError> {
        let mut store = self.store.lock().unwrap();
        store.set(URL, &snapshot.url)?;
        store.set(KEY, &snapshot.key)?;
        Ok(store.get_all())
    }
}

#[derive(Debug, Default)]
struct FormFlags {
    saving: bool,
    saved: bool,
}

/// Cloneable view of the form's transient flags
///
/// The rendering layer polls this while the form itself is busy submitting.
#[derive(Clone)]
pub struct FormStatus {
    flags: Arc<Mutex<FormFlags>>,
}

impl FormStatus {
    /// Whether a save is in progress or its acknowledgment is still shown
    pub fn saving(&self) -> bool {
        self.flags.lock().unwrap().saving
    }

    /// Whether a save completed since the form came up
    pub fn saved(&self) -> bool {
        self.flags.lock().unwrap().saved
    }
}

/// Controller for the credential/URL settings form
pub struct SettingsForm<E> {
    endpoint: E,
    draft: SettingsSnapshot,
    flags: Arc<Mutex<FormFlags>>,
    reset_task: Option<JoinHandle<()>>,
}

impl SettingsForm<StoreEndpoint> {
    /// Build a form over a shared store, seeding the draft from it
    pub fn for_store(store: Arc<Mutex<SettingsStore>>) -> Self {
        let draft = store.lock().unwrap().get_all();
        Self::new(StoreEndpoint::new(store), draft)
    }
}

impl<E: SettingsEndpoint> SettingsForm<E> {
    /// Create a form seeded with the currently persisted snapshot
    pub fn new(endpoint: E, current: SettingsSnapshot) -> Self {
        Self {
            endpoint,
            draft: current,
            flags: Arc::new(Mutex::new(FormFlags::default())),
            reset_task: None,
        }
    }

    /// Current draft values
    pub fn draft(&self) -> &SettingsSnapshot {
        &self.draft
    }

    /// Edit the base URL in the draft
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.draft.url = url.into();
    }

    /// Edit the credential in the draft
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.draft.key = key.into();
    }

    /// Whether a save is in progress or its acknowledgment is still shown
    pub fn saving(&self) -> bool {
        self.flags.lock().unwrap().saving
    }

    /// Whether a save completed since the form came up
    pub fn saved(&self) -> bool {
        self.flags.lock().unwrap().saved
    }

    /// View of the flags that outlives a borrow of the form
    pub fn status(&self) -> FormStatus {
        FormStatus {
            flags: Arc::clone(&self.flags),
        }
    }

    /// Submit the full draft as one atomic update
    ///
    /// On success the endpoint's acknowledgment is merged back into the
    /// draft and the saving indicator is scheduled to clear 2000ms later.
    pub async fn submit(&mut self) -> Result<(), SettingsError> {
        self.flags.lock().unwrap().saving = true;

        match self.endpoint.save(&self.draft).await {
            Ok(ack) => {
                debug!("Settings saved");
                self.draft = ack;
                {
                    let mut flags = self.flags.lock().unwrap();
                    flags.saved = true;
                }
                self.schedule_saving_reset();
                Ok(())
            }
            Err(err) => {
                warn!("Settings save failed: {}", err);
                self.flags.lock().unwrap().saving = false;
                Err(err)
            }
        }
    }

    /// One deferred action; re-submitting replaces the previous one
    fn schedule_saving_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
        let flags = Arc::clone(&self.flags);
        self.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(SAVED_RESET_DELAY).await;
            flags.lock().unwrap().saving = false;
        }));
    }
}

impl<E> Drop for SettingsForm<E> {
    fn drop(&mut self) {
        // Teardown must not leave a timer firing at a dead form
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}
