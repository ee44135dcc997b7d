//! File lifecycle orchestration.
//!
//! [`FileManager`] maps file names to records in a [`KeyValueStore`] and moves
//! content between those records and the injected source and chart modules.
//! It also tracks the open file, the cached listing of stored names, and the
//! saving / last-save status.
//!
//! Every mutating operation finishes by re-listing the store, so the cached
//! listing matches storage once the operation has completed. A refresh that
//! fails is logged and leaves the previous listing in place; it does not fail
//! the operation it follows.
//!
//! Operations take `&self` and only touch in-memory state between store
//! calls, so several of them can be in flight on one manager and interleave
//! at those calls. Nothing serializes them:
//!
//! * concurrent saves to the same name are last-write-wins;
//! * default names are picked from the cached listing, so two concurrent
//!   [`FileManager::new_file`] calls can pick the same name;
//! * [`FileManager::rename_file`] saves under the new name and then deletes
//!   the old one. If the delete fails both names stay in the store.
//!
//! Failures are logged and also returned to the caller.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::error::{FileError, FileResult, StoreOp};
use crate::events::{EventBus, FileEvent};
use crate::modules::{Persistable, SharedModule};
use crate::naming::default_file_name;
use crate::record::{self, FileRecord};
use crate::storage::KeyValueStore;


#[derive(Debug, Default)]
struct ManagerState {
    files: Vec<String>,
    current_file: Option<String>,
    saving: bool,
    last_save: Option<DateTime<Utc>>,
}

/// Sets `saving` for as long as it lives, including when the save future is
/// dropped before finishing.
struct SavingGuard<'a> {
    state: &'a Mutex<ManagerState>,
}

impl<'a> SavingGuard<'a> {
    fn begin(state: &'a Mutex<ManagerState>) -> Self {
        state.lock().saving = true;
        Self { state }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().saving = false;
    }
}

pub struct FileManager<S> {
    store: S,
    source: SharedModule,
    chart: SharedModule,
    state: Mutex<ManagerState>,
    events: EventBus,
}

impl<S: KeyValueStore> FileManager<S> {
    pub fn new(store: S, source: SharedModule, chart: SharedModule) -> Self {
        Self {
            store,
            source,
            chart,
            state: Mutex::new(ManagerState::default()),
            events: EventBus::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Names from the most recent successful listing.
    pub fn files(&self) -> Vec<String> {
        self.state.lock().files.clone()
    }

    pub fn current_file(&self) -> Option<String> {
        self.state.lock().current_file.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().saving
    }

    pub fn last_save(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_save
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.events.subscribe()
    }

    /// Replace the cached listing with the store's current keys.
    pub async fn list_files(&self) -> FileResult<()> {
        debug!("loading file list");
        let keys = self
            .store
            .keys()
            .await
            .map_err(FileError::storage(StoreOp::Keys))
            .inspect_err(|e| error!("error loading file list: {}", e))?;

        let count = keys.len();
        self.state.lock().files = keys;
        self.events.send(FileEvent::Listed { count });
        Ok(())
    }

    /// Best-effort listing refresh after another step.
    async fn refresh(&self) {
        let _ = self.list_files().await;
    }

    /// Open `name` into the source and chart modules.
    ///
    /// Returns `Ok(false)` without touching any module when there is no such
    /// record or the record has no source text.
    pub async fn load_file(&self, name: &str) -> FileResult<bool> {
        self.refresh().await;
        info!(file = %name, "loading file");

        let record = self
            .store
            .get_item(name)
            .await
            .map_err(FileError::storage(StoreOp::Get))
            .inspect_err(|e| error!(file = %name, "error loading file: {}", e))?;

        let Some(record) = record else {
            return Ok(false);
        };
        let Some(source) = record::source_of(&record).filter(|s| !s.is_empty()) else {
            return Ok(false);
        };

        self.apply_record(name, &record, source);
        Ok(true)
    }

    /// Like [`FileManager::load_file`], but also opens records whose source
    /// is empty, such as the ones [`FileManager::new_file`] writes.
    ///
    /// Returns `Ok(false)` only when there is no such record.
    pub async fn open_file(&self, name: &str) -> FileResult<bool> {
        self.refresh().await;
        info!(file = %name, "opening file");

        let record = self
            .store
            .get_item(name)
            .await
            .map_err(FileError::storage(StoreOp::Get))
            .inspect_err(|e| error!(file = %name, "error opening file: {}", e))?;

        let Some(record) = record else {
            return Ok(false);
        };
        let source = record::source_of(&record).unwrap_or_default();

        self.apply_record(name, &record, source);
        Ok(true)
    }

    fn apply_record(&self, name: &str, record: &Value, source: &str) {
        self.chart.write().load(record::chart_of(record));
        self.source.write().load(record::source_snapshot(source));
        self.state.lock().current_file = Some(name.to_string());

        self.events.send(FileEvent::Loaded {
            name: name.to_string(),
        });
    }

    /// Write the modules' current content and return the name it was saved
    /// under.
    ///
    /// Without a name (or with an empty one) this saves to the open file, or
    /// to a fresh default name when nothing is open. On failure the open file
    /// and last-save time are left as they were.
    pub async fn save_file(&self, name: Option<&str>) -> FileResult<String> {
        let _saving = SavingGuard::begin(&self.state);

        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let state = self.state.lock();
                state
                    .current_file
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| default_file_name(&state.files))
            }
        };
        info!(file = %name, "saving file");

        self.write_modules(&name)
            .await
            .inspect_err(|e| error!(file = %name, "error saving file: {}", e))?;
        self.refresh().await;

        {
            let mut state = self.state.lock();
            state.last_save = Some(Utc::now());
            if state.current_file.as_deref() != Some(name.as_str()) {
                state.current_file = Some(name.clone());
            }
        }

        self.events.send(FileEvent::Saved { name: name.clone() });
        Ok(name)
    }

    async fn write_modules(&self, name: &str) -> FileResult<()> {
        let record = FileRecord::compose(self.source.read().save(), self.chart.read().save());
        let value = record.normalized().map_err(FileError::Serialize)?;
        self.store
            .set_item(name, value)
            .await
            .map_err(FileError::storage(StoreOp::Set))
    }

    /// The name an unnamed save would use right now, from the cached listing.
    pub fn generate_default_file_name(&self) -> String {
        default_file_name(&self.state.lock().files)
    }

    /// Close the open file, clear both modules and save the empty content
    /// under a default name.
    pub async fn new_file(&self) -> FileResult<String> {
        self.state.lock().current_file = None;
        self.source.write().reset();
        self.chart.write().reset();
        self.save_file(None).await
    }

    /// Remove `name` from the store. Does nothing for a missing or empty name.
    pub async fn delete_file(&self, name: Option<&str>) -> FileResult<()> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        info!(file = %name, "deleting file");

        self.store
            .remove_item(name)
            .await
            .map_err(FileError::storage(StoreOp::Remove))
            .inspect_err(|e| error!(file = %name, "error deleting file: {}", e))?;
        self.refresh().await;

        self.events.send(FileEvent::Deleted {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Save the open content as `new_name` and drop the old record.
    ///
    /// The save happens first. If it fails nothing is deleted. If the
    /// following delete fails, the content exists under both names and the
    /// new name is the open file.
    pub async fn rename_file(&self, new_name: &str) -> FileResult<()> {
        let old_name = self.current_file();

        let new_name = self
            .save_file(Some(new_name))
            .await
            .inspect_err(|e| error!("error renaming file: {}", e))?;

        if old_name.as_deref() != Some(new_name.as_str()) {
            self.delete_file(old_name.as_deref())
                .await
                .inspect_err(|e| error!("error renaming file: {}", e))?;
            self.state.lock().current_file = Some(new_name.clone());
        }
        self.refresh().await;

        self.events.send(FileEvent::Renamed {
            from: old_name,
            to: new_name,
        });
        Ok(())
    }

    /// Open uploaded JSON text and store it verbatim under `name`.
    ///
    /// Content that does not parse changes nothing. A store failure after a
    /// successful parse leaves the modules holding the uploaded content.
    pub async fn load_file_from_upload(&self, content: &str, name: &str) -> FileResult<()> {
        info!(file = %name, "loading file from upload");

        let data: Value = serde_json::from_str(content)
            .map_err(FileError::Parse)
            .inspect_err(|e| error!(file = %name, "error loading file from upload: {}", e))?;

        self.source
            .write()
            .load(record::source_snapshot(record::source_of(&data).unwrap_or_default()));
        self.chart.write().load(record::chart_of(&data));

        self.store
            .set_item(name, data)
            .await
            .map_err(FileError::storage(StoreOp::Set))
            .inspect_err(|e| error!(file = %name, "error loading file from upload: {}", e))?;
        self.refresh().await;

        self.state.lock().current_file = Some(name.to_string());
        info!("current file set to {}", name);

        self.events.send(FileEvent::Imported {
            name: name.to_string(),
        });
        Ok(())
    }

    /// The stored record for `name` as pretty JSON, in the shape
    /// [`FileManager::load_file_from_upload`] accepts.
    pub async fn export_file(&self, name: &str) -> FileResult<String> {
        let record = self
            .store
            .get_item(name)
            .await
            .map_err(FileError::storage(StoreOp::Get))
            .inspect_err(|e| error!(file = %name, "error exporting file: {}", e))?
            .ok_or_else(|| FileError::NotFound(name.to_string()))?;

        serde_json::to_string_pretty(&record).map_err(FileError::Serialize)
    }
}
