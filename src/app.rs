//! App Core for Tab Wrangler.
//!
//! [`TabWrangler`] owns the host context and every stateful component, and
//! exposes one method per inbound host command. Each command runs to
//! completion before the next one is handled.

use std::collections::HashSet;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::host::Context;
use crate::managers::activity_tracker::{ActivityTracker, ActivityTrackerTrait};
use crate::managers::closed_tabs::{ClosedTabs, UnwrangleReport, WrangleReport};
use crate::managers::lock_registry::{self, LockRegistry};
use crate::services::backup;
use crate::services::badge;
use crate::services::settings_engine::SettingsStore;
use crate::services::tab_filter::{self, TabFilter};
use crate::services::whitelist::Whitelist;
use crate::types::backup::{ExportBundle, ImportBundle};
use crate::types::errors::WranglerError;
use crate::types::settings::{
    Counters, MINUTES_INACTIVE, MIN_TABS, PAUSED, TOTAL_TABS_REMOVED, TOTAL_TABS_UNWRANGLED,
    TOTAL_TABS_WRANGLED, WranglerSettings,
};
use crate::types::tab::{TabId, TabRecord, TabRef};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Central struct holding the context and the tab lifecycle components.
pub struct TabWrangler {
    ctx: Context,
    tracker: ActivityTracker,
    closed_tabs: ClosedTabs,
}

impl TabWrangler {
    pub fn new(ctx: Context) -> Self {
        let tracker = ActivityTracker::new(ctx.clock.clone());
        Self {
            ctx,
            tracker,
            closed_tabs: ClosedTabs::new(),
        }
    }

    /// Startup: loads the persisted archive and renders the badge.
    pub fn init(&mut self) -> Result<(), WranglerError> {
        self.closed_tabs.init(self.ctx.storage.as_ref())?;
        self.update_badge();
        info!(saved_tabs = self.closed_tabs.len(), "tab wrangler ready");
        Ok(())
    }

    /// Seeds the tracker from a full enumeration of open tabs.
    pub fn init_tabs(&mut self, tabs: &[TabRecord]) {
        self.tracker.init_all(tabs);
    }

    pub fn tab_accessed(&mut self, target: TabRef<'_>) -> Option<TabId> {
        self.tracker.record_access(target)
    }

    /// The host closed a tab on its own.
    pub fn tab_removed(&mut self, tab_id: TabId) {
        self.tracker.forget(tab_id);
    }

    /// Picks the open tabs due for wrangling.
    ///
    /// Tabs idle longer than `minutesInactive` qualify unless locked or
    /// whitelisted. Oldest go first, and at least `minTabs` tabs stay open.
    /// Open tabs the tracker has never seen are stamped now and wait for a
    /// later tick.
    pub fn select_wrangle_candidates(&mut self, open_tabs: &[TabRecord]) -> Vec<TabRecord> {
        let settings = self.ctx.settings.as_ref();
        if settings.get_bool(PAUSED) {
            return Vec::new();
        }

        for tab in open_tabs {
            if self.tracker.last_accessed(tab.id).is_none() {
                self.tracker.record_access(TabRef::Tab(tab));
            }
        }

        let minutes_inactive = i64::try_from(settings.get_u64(MINUTES_INACTIVE)).unwrap_or(i64::MAX);
        let cutoff = self
            .ctx
            .now()
            .saturating_sub(minutes_inactive.saturating_mul(MILLIS_PER_MINUTE));
        let stale: HashSet<TabId> = self.tracker.older_than(Some(cutoff)).into_iter().collect();
        let locked = lock_registry::locked_ids(settings);
        let whitelist = Whitelist::from_settings(settings);

        let mut candidates: Vec<&TabRecord> = open_tabs
            .iter()
            .filter(|tab| stale.contains(&tab.id))
            .filter(|tab| !locked.contains(&tab.id))
            .filter(|tab| {
                !tab.url
                    .as_deref()
                    .is_some_and(|url| whitelist.is_whitelisted(url))
            })
            .collect();
        candidates.sort_by_key(|tab| self.tracker.last_accessed(tab.id).unwrap_or(i64::MIN));
        candidates.truncate(open_tabs.len().saturating_sub(settings.get_usize(MIN_TABS)));

        candidates.into_iter().cloned().collect()
    }

    /// Archives the given tabs as-is. Eligibility is the caller's concern.
    pub fn wrangle(&mut self, tabs: Vec<TabRecord>) -> WrangleReport {
        let report = self.closed_tabs.wrangle_tabs(tabs, &mut self.ctx);
        for &tab_id in &report.wrangled {
            self.tracker.forget(tab_id);
        }
        self.update_badge();
        report
    }

    /// One scheduler tick: select idle tabs and wrangle them.
    pub fn wrangle_idle_tabs(&mut self, open_tabs: &[TabRecord]) -> WrangleReport {
        let candidates = self.select_wrangle_candidates(open_tabs);
        if candidates.is_empty() {
            return WrangleReport::default();
        }
        debug!(count = candidates.len(), "wrangling idle tabs");
        self.wrangle(candidates)
    }

    /// Restores archived tabs by id. Unknown ids are skipped.
    ///
    /// Restored tabs are not tracked until the host reports them again.
    pub fn unwrangle_ids(&mut self, tab_ids: &[TabId]) -> UnwrangleReport {
        let tabs: Vec<TabRecord> = tab_ids
            .iter()
            .filter_map(|&id| {
                self.closed_tabs
                    .find_position_by_id(id)
                    .map(|index| self.closed_tabs.tabs()[index].clone())
            })
            .collect();
        let report = self.closed_tabs.unwrangle_tabs(tabs, &mut self.ctx);
        self.update_badge();
        report
    }

    /// Deletes an archived record without restoring it.
    pub fn remove_saved_tab(&mut self, tab_id: TabId) -> Option<TabRecord> {
        let removed = self.closed_tabs.remove_tab(tab_id, self.ctx.storage.as_mut())?;
        let total = self.ctx.settings.get_u64(TOTAL_TABS_REMOVED) + 1;
        if let Err(e) = self.ctx.settings.set(TOTAL_TABS_REMOVED, json!(total)) {
            warn!(error = %e, "failed to persist removed counter");
        }
        self.update_badge();
        Some(removed)
    }

    /// Irreversibly empties the archive.
    pub fn clear_saved_tabs(&mut self) {
        self.closed_tabs.clear(self.ctx.storage.as_mut());
        self.update_badge();
    }

    pub fn lock_tab(&mut self, tab_id: TabId) -> Result<(), WranglerError> {
        LockRegistry::new(self.ctx.settings.as_mut()).lock_tab(tab_id)?;
        Ok(())
    }

    pub fn unlock_tab(&mut self, tab_id: TabId) -> Result<(), WranglerError> {
        LockRegistry::new(self.ctx.settings.as_mut()).unlock_tab(tab_id)?;
        Ok(())
    }

    pub fn is_locked(&self, tab_id: TabId) -> bool {
        lock_registry::is_locked(self.ctx.settings.as_ref(), tab_id)
    }

    pub fn whitelist_match(&self, url: &str) -> Option<String> {
        Whitelist::from_settings(self.ctx.settings.as_ref())
            .match_for(url)
            .map(str::to_string)
    }

    pub fn search(&self, filters: &[TabFilter]) -> Vec<&TabRecord> {
        tab_filter::search(self.closed_tabs.tabs(), filters)
    }

    pub fn saved_tabs(&self) -> &[TabRecord] {
        self.closed_tabs.tabs()
    }

    pub fn counters(&self) -> Counters {
        let settings = self.ctx.settings.as_ref();
        Counters {
            total_tabs_wrangled: settings.get_u64(TOTAL_TABS_WRANGLED),
            total_tabs_unwrangled: settings.get_u64(TOTAL_TABS_UNWRANGLED),
            total_tabs_removed: settings.get_u64(TOTAL_TABS_REMOVED),
            saved_tabs: self.closed_tabs.len(),
        }
    }

    pub fn export_backup(&self) -> ExportBundle {
        let counters = self.counters();
        ExportBundle {
            saved_tabs: self.closed_tabs.tabs().to_vec(),
            total_tabs_removed: counters.total_tabs_removed,
            total_tabs_unwrangled: counters.total_tabs_unwrangled,
            total_tabs_wrangled: counters.total_tabs_wrangled,
        }
    }

    /// Parses backup file contents and applies them. Nothing changes unless
    /// the whole file validates.
    pub fn import_backup(&mut self, contents: &str) -> Result<(), WranglerError> {
        let bundle = backup::parse_backup(contents)?;
        self.apply_backup(bundle)
    }

    /// Replaces the counters and the archive with the bundle's values.
    ///
    /// The counters are committed together first; if that fails the archive
    /// is left alone.
    pub fn apply_backup(&mut self, bundle: ImportBundle) -> Result<(), WranglerError> {
        let defaults = WranglerSettings::default();
        self.ctx.settings.set_all(&[
            (
                TOTAL_TABS_REMOVED,
                json!(bundle.total_tabs_removed.unwrap_or(defaults.total_tabs_removed)),
            ),
            (
                TOTAL_TABS_UNWRANGLED,
                json!(bundle.total_tabs_unwrangled.unwrap_or(defaults.total_tabs_unwrangled)),
            ),
            (
                TOTAL_TABS_WRANGLED,
                json!(bundle.total_tabs_wrangled.unwrap_or(defaults.total_tabs_wrangled)),
            ),
        ])?;

        match bundle.saved_tabs {
            Some(tabs) => self.closed_tabs.replace_all(tabs, self.ctx.storage.as_mut()),
            None => self.closed_tabs.clear(self.ctx.storage.as_mut()),
        }
        self.update_badge();
        info!(saved_tabs = self.closed_tabs.len(), "backup imported");
        Ok(())
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.ctx.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.ctx.settings.as_mut()
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    pub fn closed_tabs(&self) -> &ClosedTabs {
        &self.closed_tabs
    }

    fn update_badge(&mut self) {
        badge::update_closed_count(&mut self.ctx, self.closed_tabs.len());
    }
}
