//! The authoritative collection of user-created masks.
//!
//! Mutations go through [`MaskStore`] commands and are persisted by the
//! underlying [`PersistStore`]. Reads of built-in masks never consult the
//! persisted collection: [`MaskStore::get_all`] rebuilds them from their
//! factories every time, so a stale or deleted copy on disk cannot hide them.

pub mod migration;

use crate::core::config::AppConfig;
use crate::core::lang::Lang;
use crate::core::mask::{
    builtin_masks, create_empty_mask, is_builtin_id, Mask, MaskPatch, DEFAULT_MASK_ID,
};
use crate::core::persist::{PersistError, PersistStore, PersistedState, SubscriptionId};
use crate::utils::id::new_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

pub const CURRENT_VERSION: f64 = 3.2;

/// Looked up when `get` is called without an id; never a valid mask id.
const MISSING_ID_SENTINEL: &str = "1145141919810";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Lang>,
    #[serde(default)]
    pub masks: BTreeMap<String, Mask>,
}

impl PersistedState for MaskState {
    const NAME: &'static str = "mask-store";
    const VERSION: f64 = CURRENT_VERSION;
    type MigrationContext = AppConfig;

    fn migrate(state: Self, from_version: f64, config: &AppConfig) -> Self {
        migration::migrate(state, from_version, config, &mut new_id)
    }
}

/// Order masks newest first; ties keep their input order.
pub fn sort_newest_first(mut masks: Vec<Mask>) -> Vec<Mask> {
    masks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    masks
}

pub struct MaskStore {
    persist: PersistStore<MaskState>,
    config: AppConfig,
}

impl MaskStore {
    /// Open the store file at `path`, running migrations for older files.
    pub fn open(path: impl Into<PathBuf>, config: AppConfig) -> Result<Self, PersistError> {
        let persist = PersistStore::open(path, &config)?;
        Ok(Self { persist, config })
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            persist: PersistStore::in_memory(),
            config,
        }
    }

    pub fn with_state(state: MaskState, config: AppConfig) -> Self {
        Self {
            persist: PersistStore::with_state(state),
            config,
        }
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.config
    }

    /// Language new and built-in masks are tagged with.
    fn effective_lang(&self) -> Lang {
        self.language().unwrap_or_else(|| self.config.lang())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_id();
            if !self.persist.get().masks.contains_key(&id) && !is_builtin_id(&id) {
                return id;
            }
        }
    }

    /// Insert a new user mask built from an empty mask plus `partial`.
    ///
    /// Any `id` or `builtin` in `partial` is ignored: the mask always gets a
    /// freshly generated id and is never built-in.
    pub fn create(&mut self, partial: Option<MaskPatch>) -> Mask {
        let mut mask = create_empty_mask(&self.config.model_config, self.effective_lang());
        if let Some(patch) = partial {
            patch.apply(&mut mask);
        }
        mask.id = self.fresh_id();
        mask.builtin = false;

        let created = mask.clone();
        self.persist.set(move |state| {
            state.masks.insert(mask.id.clone(), mask);
        });
        self.persist.mark_update();
        debug!(id = %created.id, name = %created.name, "Created mask");
        created
    }

    /// Apply `updater` to a copy of the mask stored under `id` and write the copy back.
    ///
    /// Unknown ids are a no-op and `updater` is not called. The mask keeps
    /// its id whatever `updater` does. Returns whether an update happened.
    pub fn update_mask<F>(&mut self, id: &str, updater: F) -> bool
    where
        F: FnOnce(&mut Mask),
    {
        let Some(existing) = self.persist.get().masks.get(id) else {
            debug!(id, "Ignoring update for unknown mask");
            return false;
        };

        let mut updated = existing.clone();
        updater(&mut updated);
        if updated.id != id {
            debug!(id, rejected = %updated.id, "Keeping mask id fixed during update");
            updated.id = id.to_string();
        }
        let key = id.to_string();
        self.persist.set(move |state| {
            state.masks.insert(key, updated);
        });
        self.persist.mark_update();
        true
    }

    /// Remove the mask stored under `id`. The default mask cannot be deleted.
    pub fn delete(&mut self, id: &str) -> bool {
        if id == DEFAULT_MASK_ID {
            debug!(id, "Refusing to delete the default mask");
            return false;
        }
        if !self.persist.get().masks.contains_key(id) {
            return false;
        }

        self.persist.set(|state| {
            state.masks.remove(id);
        });
        self.persist.mark_update();
        true
    }

    /// Point lookup in the persisted collection. `None` never matches.
    pub fn get(&self, id: Option<&str>) -> Option<&Mask> {
        self.persist
            .get()
            .masks
            .get(id.unwrap_or(MISSING_ID_SENTINEL))
    }

    /// Built-in masks, freshly rebuilt and sorted newest first.
    ///
    /// Takes `&self`: reading never writes to the persisted collection.
    pub fn get_all(&self) -> Vec<Mask> {
        sort_newest_first(builtin_masks(
            &self.config.model_config,
            self.effective_lang(),
        ))
    }

    /// Every persisted mask, unfiltered. `_text` is accepted for callers but not used yet.
    pub fn search(&self, _text: &str) -> Vec<Mask> {
        self.persist.get().masks.values().cloned().collect()
    }

    pub fn set_language(&mut self, language: Option<Lang>) {
        self.persist.set(|state| state.language = language);
        self.persist.mark_update();
    }

    pub fn language(&self) -> Option<Lang> {
        self.persist.get().language
    }

    pub fn masks(&self) -> &BTreeMap<String, Mask> {
        &self.persist.get().masks
    }

    pub fn len(&self) -> usize {
        self.persist.get().masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persist.get().masks.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.persist.is_dirty()
    }

    /// Write pending changes to disk. Returns whether anything was written.
    pub fn flush(&mut self) -> Result<bool, PersistError> {
        self.persist.flush()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MaskState) + 'static,
    {
        self.persist.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.persist.unsubscribe(id)
    }
}
