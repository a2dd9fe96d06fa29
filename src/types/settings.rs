use serde::{Deserialize, Serialize};

use super::tab::TabId;

pub const MAX_TABS: &str = "maxTabs";
pub const MIN_TABS: &str = "minTabs";
pub const MINUTES_INACTIVE: &str = "minutesInactive";
pub const PAUSED: &str = "paused";
pub const SHOW_BADGE_COUNT: &str = "showBadgeCount";
pub const WHITELIST: &str = "whitelist";
pub const LOCKED_IDS: &str = "lockedIds";
pub const INSTALL_DATE: &str = "installDate";
pub const TOTAL_TABS_REMOVED: &str = "totalTabsRemoved";
pub const TOTAL_TABS_UNWRANGLED: &str = "totalTabsUnwrangled";
pub const TOTAL_TABS_WRANGLED: &str = "totalTabsWrangled";

/// All options and counters owned by the settings store.
///
/// Serialized with the camelCase key names the host uses, so a key passed to
/// `SettingsStore::get` is exactly the JSON field name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WranglerSettings {
    /// Capacity of the closed-tab archive.
    pub max_tabs: usize,
    /// Never wrangle below this many open tabs.
    pub min_tabs: usize,
    pub minutes_inactive: u64,
    pub paused: bool,
    pub show_badge_count: bool,
    pub whitelist: Vec<String>,
    pub locked_ids: Vec<TabId>,
    /// Milliseconds since epoch when the settings were first created.
    pub install_date: i64,
    pub total_tabs_removed: u64,
    pub total_tabs_unwrangled: u64,
    pub total_tabs_wrangled: u64,
}

impl Default for WranglerSettings {
    fn default() -> Self {
        Self {
            max_tabs: 100,
            min_tabs: 5,
            minutes_inactive: 20,
            paused: false,
            show_badge_count: true,
            whitelist: vec!["about:".to_string(), "chrome://".to_string()],
            locked_ids: Vec::new(),
            install_date: 0,
            total_tabs_removed: 0,
            total_tabs_unwrangled: 0,
            total_tabs_wrangled: 0,
        }
    }
}

/// Snapshot of the three persisted counters plus the derived archive size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub total_tabs_wrangled: u64,
    pub total_tabs_unwrangled: u64,
    pub total_tabs_removed: u64,
    pub saved_tabs: usize,
}
