//! Lock Registry.
//!
//! Locked tabs are never selected for wrangling. The set lives in the
//! settings store under `lockedIds`, so the registry is a thin view created
//! on demand over whatever store the caller holds.

use serde_json::json;

use crate::services::settings_engine::SettingsStore;
use crate::types::errors::SettingsError;
use crate::types::settings::LOCKED_IDS;
use crate::types::tab::TabId;

/// Lock registry borrowing a settings store.
pub struct LockRegistry<'a> {
    settings: &'a mut dyn SettingsStore,
}

impl<'a> LockRegistry<'a> {
    pub fn new(settings: &'a mut dyn SettingsStore) -> Self {
        Self { settings }
    }

    /// Adds `tab_id` unless it is not positive or already locked, then persists.
    pub fn lock_tab(&mut self, tab_id: TabId) -> Result<(), SettingsError> {
        let mut locked = self.locked_ids();
        if tab_id > 0 && !locked.contains(&tab_id) {
            locked.push(tab_id);
        }
        self.settings.set(LOCKED_IDS, json!(locked))
    }

    /// Removes `tab_id` if present, then persists.
    pub fn unlock_tab(&mut self, tab_id: TabId) -> Result<(), SettingsError> {
        let mut locked = self.locked_ids();
        if let Some(index) = locked.iter().position(|&id| id == tab_id) {
            locked.remove(index);
        }
        self.settings.set(LOCKED_IDS, json!(locked))
    }

    pub fn is_locked(&self, tab_id: TabId) -> bool {
        is_locked(&*self.settings, tab_id)
    }

    pub fn locked_ids(&self) -> Vec<TabId> {
        locked_ids(&*self.settings)
    }
}

/// Read-only membership test for callers holding a shared borrow.
pub fn is_locked(settings: &dyn SettingsStore, tab_id: TabId) -> bool {
    locked_ids(settings).contains(&tab_id)
}

pub fn locked_ids(settings: &dyn SettingsStore) -> Vec<TabId> {
    settings.get_ids(LOCKED_IDS)
}
