//! Closed-tab archive.
//!
//! Holds the records of wrangled tabs, most recently closed first, capped at
//! the `maxTabs` option and persisted under the `savedTabs` storage key after
//! every mutation. Wrangle and unwrangle are the only transitions between an
//! open tab and an archived record.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::database::Storage;
use crate::host::Context;
use crate::types::errors::{HostError, StorageError};
use crate::types::settings::{INSTALL_DATE, MAX_TABS, TOTAL_TABS_UNWRANGLED, TOTAL_TABS_WRANGLED};
use crate::types::tab::{TabId, TabRecord};

/// Storage key of the persisted archive.
pub const SAVED_TABS_KEY: &str = "savedTabs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    Uninitialized,
    Ready,
}

/// Outcome of a wrangle batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrangleReport {
    /// Ids archived, in input order.
    pub wrangled: Vec<TabId>,
    /// Oldest records dropped to stay within capacity.
    pub evicted: Vec<TabRecord>,
    /// Tabs the host refused to close; these were left open and unarchived.
    pub failures: Vec<HostError>,
}

/// Outcome of an unwrangle batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnwrangleReport {
    /// Ids re-created on the host, in input order.
    pub restored: Vec<TabId>,
    /// How many of those counted toward `totalTabsUnwrangled`.
    pub counted: u64,
    /// Tabs the host refused to create; their records stay archived.
    pub failures: Vec<HostError>,
}

pub struct ClosedTabs {
    tabs: Vec<TabRecord>,
    state: ArchiveState,
}

impl ClosedTabs {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            state: ArchiveState::Uninitialized,
        }
    }

    /// Loads the persisted archive. A missing key means an empty archive.
    /// Calling it again reloads from storage.
    pub fn init(&mut self, storage: &dyn Storage) -> Result<(), StorageError> {
        self.tabs = match storage.get(SAVED_TABS_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", SAVED_TABS_KEY, e)))?,
            None => Vec::new(),
        };
        self.state = ArchiveState::Ready;
        debug!(count = self.tabs.len(), "closed tabs loaded");
        Ok(())
    }

    /// Empties the archive and deletes the persisted copy.
    pub fn clear(&mut self, storage: &mut dyn Storage) {
        self.tabs.clear();
        if let Err(e) = storage.remove(SAVED_TABS_KEY) {
            warn!(error = %e, "failed to delete persisted closed tabs");
        }
    }

    /// Index of the first record with `tab_id`, scanning from the front.
    pub fn find_position_by_id(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    /// Removes the first record with `tab_id` and persists. `None` when absent,
    /// in which case nothing is written.
    pub fn remove_tab(&mut self, tab_id: TabId, storage: &mut dyn Storage) -> Option<TabRecord> {
        let index = self.find_position_by_id(tab_id)?;
        let removed = self.tabs.remove(index);
        self.save(storage);
        Some(removed)
    }

    /// Closes each tab on the host and archives it at the front, then evicts
    /// the oldest records beyond `maxTabs` and persists once.
    ///
    /// A tab the host refuses to close is skipped and reported; the rest of
    /// the batch still runs.
    pub fn wrangle_tabs(&mut self, tabs: Vec<TabRecord>, ctx: &mut Context) -> WrangleReport {
        let max_tabs = ctx.settings.get_usize(MAX_TABS);
        let mut total_wrangled = ctx.settings.get_u64(TOTAL_TABS_WRANGLED);
        let mut report = WrangleReport::default();

        for mut tab in tabs {
            if let Err(e) = ctx.host.remove_tab(tab.id) {
                warn!(tab_id = tab.id, error = %e, "host refused to close tab");
                report.failures.push(e);
                continue;
            }
            tab.closed_at = Some(ctx.now());
            report.wrangled.push(tab.id);
            self.tabs.insert(0, tab);
            total_wrangled += 1;
        }

        if self.tabs.len() > max_tabs {
            report.evicted = self.tabs.split_off(max_tabs);
        }

        set_counter(ctx, TOTAL_TABS_WRANGLED, total_wrangled);
        self.save(ctx.storage.as_mut());
        debug!(
            wrangled = report.wrangled.len(),
            evicted = report.evicted.len(),
            failed = report.failures.len(),
            "wrangle batch done"
        );
        report
    }

    /// Re-creates each tab on the host (not focused) and removes its record.
    ///
    /// Only records closed at or after `installDate` count toward
    /// `totalTabsUnwrangled`; older ones are restored without counting.
    pub fn unwrangle_tabs(&mut self, tabs: Vec<TabRecord>, ctx: &mut Context) -> UnwrangleReport {
        let install_date = ctx.settings.get_i64(INSTALL_DATE);
        let mut report = UnwrangleReport::default();

        for tab in tabs {
            if let Err(e) = ctx.host.create_tab(tab.url.as_deref(), false) {
                warn!(tab_id = tab.id, error = %e, "host refused to restore tab");
                report.failures.push(e);
                continue;
            }
            self.remove_tab(tab.id, ctx.storage.as_mut());
            if tab.closed_at.is_some_and(|closed_at| closed_at >= install_date) {
                report.counted += 1;
            }
            report.restored.push(tab.id);
        }

        let total_unwrangled = ctx.settings.get_u64(TOTAL_TABS_UNWRANGLED) + report.counted;
        set_counter(ctx, TOTAL_TABS_UNWRANGLED, total_unwrangled);
        debug!(
            restored = report.restored.len(),
            counted = report.counted,
            failed = report.failures.len(),
            "unwrangle batch done"
        );
        report
    }

    /// Replaces the whole archive, as a backup import does. No eviction.
    pub fn replace_all(&mut self, tabs: Vec<TabRecord>, storage: &mut dyn Storage) {
        self.tabs = tabs;
        self.state = ArchiveState::Ready;
        self.save(storage);
    }

    pub fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn state(&self) -> ArchiveState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ArchiveState::Ready
    }

    fn save(&self, storage: &mut dyn Storage) {
        let value = match serde_json::to_value(&self.tabs) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to serialize closed tabs");
                return;
            }
        };
        if let Err(e) = storage.set(SAVED_TABS_KEY, &value) {
            warn!(error = %e, "failed to persist closed tabs");
        }
    }
}

impl Default for ClosedTabs {
    fn default() -> Self {
        Self::new()
    }
}

fn set_counter(ctx: &mut Context, key: &str, total: u64) {
    let value: Value = json!(total);
    if let Err(e) = ctx.settings.set(key, value) {
        warn!(key = key, error = %e, "failed to persist counter");
    }
}
