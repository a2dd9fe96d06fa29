use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::host::Clock;
use crate::types::tab::{TabId, TabRecord, TabRef};

/// Trait defining the last-access tracking interface.
pub trait ActivityTrackerTrait {
    fn record_access(&mut self, target: TabRef<'_>) -> Option<TabId>;
    fn older_than(&self, threshold: Option<i64>) -> Vec<TabId>;
    fn all(&self) -> Vec<TabId>;
    fn forget(&mut self, tab_id: TabId);
    fn init_all(&mut self, tabs: &[TabRecord]);
    fn last_accessed(&self, tab_id: TabId) -> Option<i64>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
}

/// In-memory map of open tab id to last-accessed time (ms since epoch).
pub struct ActivityTracker {
    tab_times: HashMap<TabId, i64>,
    clock: Arc<dyn Clock>,
}

impl ActivityTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tab_times: HashMap::new(),
            clock,
        }
    }
}

impl ActivityTrackerTrait for ActivityTracker {
    /// Stamps the tab as accessed now. A payload without an integer id is
    /// logged and ignored.
    fn record_access(&mut self, target: TabRef<'_>) -> Option<TabId> {
        let Some(tab_id) = target.resolve() else {
            warn!(tab = ?target, "tab id is not an integer, access not recorded");
            return None;
        };
        self.tab_times.insert(tab_id, self.clock.now_millis());
        Some(tab_id)
    }

    /// Ids last accessed strictly before `threshold`; all ids for `None`.
    fn older_than(&self, threshold: Option<i64>) -> Vec<TabId> {
        self.tab_times
            .iter()
            .filter(|(_, &accessed)| threshold.map_or(true, |t| accessed < t))
            .map(|(&id, _)| id)
            .collect()
    }

    fn all(&self) -> Vec<TabId> {
        self.older_than(None)
    }

    fn forget(&mut self, tab_id: TabId) {
        self.tab_times.remove(&tab_id);
    }

    /// Seeds the map from a full enumeration of open tabs.
    fn init_all(&mut self, tabs: &[TabRecord]) {
        for tab in tabs {
            self.record_access(TabRef::Tab(tab));
        }
    }

    fn last_accessed(&self, tab_id: TabId) -> Option<i64> {
        self.tab_times.get(&tab_id).copied()
    }

    fn len(&self) -> usize {
        self.tab_times.len()
    }

    fn is_empty(&self) -> bool {
        self.tab_times.is_empty()
    }
}
