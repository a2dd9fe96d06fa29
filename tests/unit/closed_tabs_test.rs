//! Unit tests for the closed-tab archive: wrangle, unwrangle, capacity,
//! counters, persistence, and the host-failure policy.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde_json::json;

use tabwrangler::database::{MemoryStorage, Storage};
use tabwrangler::host::{Context, EventOutbox, ManualClock, TabHost};
use tabwrangler::managers::closed_tabs::{ArchiveState, ClosedTabs, SAVED_TABS_KEY};
use tabwrangler::services::settings_engine::{SettingsEngine, SettingsStore};
use tabwrangler::types::errors::HostError;
use tabwrangler::types::settings::{
    WranglerSettings, INSTALL_DATE, MAX_TABS, TOTAL_TABS_UNWRANGLED, TOTAL_TABS_WRANGLED,
};
use tabwrangler::types::tab::{TabId, TabRecord};

const NOW: i64 = 1_700_000_000_000;

fn tab(id: TabId) -> TabRecord {
    TabRecord::new(
        id,
        Some(format!("https://site{}.dev", id).as_str()),
        Some(format!("Site {}", id).as_str()),
    )
}

fn context(storage: &MemoryStorage, host: Box<dyn TabHost>) -> Context {
    let outbox = EventOutbox::new();
    Context {
        settings: Box::new(SettingsEngine::in_memory(WranglerSettings::default())),
        storage: Box::new(storage.clone()),
        host,
        badge: Box::new(outbox),
        clock: Arc::new(ManualClock::new(NOW)),
    }
}

fn setup() -> (ClosedTabs, Context, MemoryStorage, EventOutbox) {
    let storage = MemoryStorage::new();
    let outbox = EventOutbox::new();
    let ctx = context(&storage, Box::new(outbox.clone()));
    let mut closed = ClosedTabs::new();
    closed.init(&storage).unwrap();
    (closed, ctx, storage, outbox)
}

/// Host that refuses to touch the listed tab ids and records the rest.
#[derive(Clone, Default)]
struct PickyHost {
    refuse: HashSet<TabId>,
    refuse_urls: HashSet<String>,
    removed: Arc<Mutex<Vec<TabId>>>,
    created: Arc<Mutex<Vec<Option<String>>>>,
}

impl TabHost for PickyHost {
    fn remove_tab(&mut self, tab_id: TabId) -> Result<(), HostError> {
        if self.refuse.contains(&tab_id) {
            return Err(HostError::RemoveFailed { tab_id, reason: "tab is busy".to_string() });
        }
        self.removed.lock().unwrap().push(tab_id);
        Ok(())
    }

    fn create_tab(&mut self, url: Option<&str>, _active: bool) -> Result<(), HostError> {
        if url.is_some_and(|u| self.refuse_urls.contains(u)) {
            return Err(HostError::CreateFailed {
                url: url.map(str::to_string),
                reason: "blocked".to_string(),
            });
        }
        self.created.lock().unwrap().push(url.map(str::to_string));
        Ok(())
    }
}

// ─── Init ───

#[test]
fn test_init_loads_persisted_archive() {
    let mut storage = MemoryStorage::new();
    storage
        .set(SAVED_TABS_KEY, &json!([{"id": 4, "url": "https://a.dev", "closedAt": 5}]))
        .unwrap();

    let mut closed = ClosedTabs::new();
    assert_eq!(closed.state(), ArchiveState::Uninitialized);
    closed.init(&storage).unwrap();
    assert!(closed.is_ready());
    assert_eq!(closed.len(), 1);
    assert_eq!(closed.tabs()[0].closed_at, Some(5));
}

#[test]
fn test_init_rejects_malformed_archive() {
    let mut storage = MemoryStorage::new();
    storage.set(SAVED_TABS_KEY, &json!({"not": "a list"})).unwrap();
    let mut closed = ClosedTabs::new();
    assert!(closed.init(&storage).is_err());
}

// ─── Wrangle ───

#[test]
fn test_wrangle_archives_newest_first_and_closes_on_host() {
    let (mut closed, mut ctx, storage, outbox) = setup();

    let report = closed.wrangle_tabs(vec![tab(1), tab(2)], &mut ctx);

    assert_eq!(report.wrangled, vec![1, 2]);
    assert!(report.failures.is_empty());
    let ids: Vec<TabId> = closed.tabs().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert!(closed.tabs().iter().all(|t| t.closed_at == Some(NOW)));

    let events = outbox.drain();
    assert_eq!(events[0], json!({"event": "tabs.remove", "tabId": 1}));
    assert_eq!(events[1], json!({"event": "tabs.remove", "tabId": 2}));

    assert_eq!(ctx.settings.get_u64(TOTAL_TABS_WRANGLED), 2);
    let persisted = storage.peek(SAVED_TABS_KEY).unwrap();
    assert_eq!(persisted.as_array().unwrap().len(), 2);
    assert_eq!(persisted[0]["id"], 2);
}

#[test]
fn test_wrangle_evicts_oldest_beyond_max_tabs() {
    let (mut closed, mut ctx, storage, _outbox) = setup();
    ctx.settings.set(MAX_TABS, json!(3)).unwrap();

    closed.wrangle_tabs(vec![tab(1), tab(2)], &mut ctx);
    let report = closed.wrangle_tabs(vec![tab(3), tab(4), tab(5)], &mut ctx);

    let ids: Vec<TabId> = closed.tabs().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![5, 4, 3]);
    let evicted: Vec<TabId> = report.evicted.iter().map(|t| t.id).collect();
    assert_eq!(evicted, vec![2, 1]);
    assert_eq!(ctx.settings.get_u64(TOTAL_TABS_WRANGLED), 5);
    assert_eq!(storage.peek(SAVED_TABS_KEY).unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn test_wrangle_skips_tabs_the_host_refuses() {
    let storage = MemoryStorage::new();
    let host = PickyHost { refuse: HashSet::from([2]), ..Default::default() };
    let removed = host.removed.clone();
    let mut ctx = context(&storage, Box::new(host));
    let mut closed = ClosedTabs::new();
    closed.init(&storage).unwrap();

    let report = closed.wrangle_tabs(vec![tab(1), tab(2), tab(3)], &mut ctx);

    assert_eq!(report.wrangled, vec![1, 3]);
    assert_eq!(
        report.failures,
        vec![HostError::RemoveFailed { tab_id: 2, reason: "tab is busy".to_string() }]
    );
    assert_eq!(*removed.lock().unwrap(), vec![1, 3]);
    assert!(closed.find_position_by_id(2).is_none());
    assert_eq!(ctx.settings.get_u64(TOTAL_TABS_WRANGLED), 2);
}

// ─── Unwrangle ───

#[test]
fn test_unwrangle_restores_in_background_and_counts() {
    let (mut closed, mut ctx, storage, outbox) = setup();
    closed.wrangle_tabs(vec![tab(1), tab(2)], &mut ctx);
    outbox.drain();

    let record = closed.tabs()[closed.find_position_by_id(1).unwrap()].clone();
    let report = closed.unwrangle_tabs(vec![record], &mut ctx);

    assert_eq!(report.restored, vec![1]);
    assert_eq!(report.counted, 1);
    assert_eq!(
        outbox.drain(),
        vec![json!({"event": "tabs.create", "url": "https://site1.dev", "active": false})]
    );
    assert!(closed.find_position_by_id(1).is_none());
    assert_eq!(ctx.settings.get_u64(TOTAL_TABS_UNWRANGLED), 1);
    assert_eq!(storage.peek(SAVED_TABS_KEY).unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn test_unwrangle_counts_only_records_closed_since_install() {
    let (mut closed, mut ctx, _storage, _outbox) = setup();
    ctx.settings.set(INSTALL_DATE, json!(1_000)).unwrap();

    let mut before = tab(1);
    before.closed_at = Some(999);
    let mut at = tab(2);
    at.closed_at = Some(1_000);
    let never = tab(3);
    closed.replace_all(vec![before.clone(), at.clone(), never.clone()], ctx.storage.as_mut());

    let report = closed.unwrangle_tabs(vec![before, at, never], &mut ctx);

    assert_eq!(report.restored, vec![1, 2, 3]);
    assert_eq!(report.counted, 1);
    assert_eq!(ctx.settings.get_u64(TOTAL_TABS_UNWRANGLED), 1);
    assert!(closed.is_empty());
}

#[test]
fn test_unwrangle_keeps_record_when_host_refuses() {
    let storage = MemoryStorage::new();
    let host = PickyHost {
        refuse_urls: HashSet::from(["https://site1.dev".to_string()]),
        ..Default::default()
    };
    let created = host.created.clone();
    let mut ctx = context(&storage, Box::new(host));
    let mut closed = ClosedTabs::new();
    closed.init(&storage).unwrap();
    closed.wrangle_tabs(vec![tab(1), tab(2)], &mut ctx);

    let records = closed.tabs().to_vec();
    let report = closed.unwrangle_tabs(records, &mut ctx);

    assert_eq!(report.restored, vec![2]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(*created.lock().unwrap(), vec![Some("https://site2.dev".to_string())]);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed.tabs()[0].id, 1);
}

// ─── Remove / clear / replace ───

#[test]
fn test_remove_tab_returns_record_and_persists() {
    let (mut closed, mut ctx, storage, _outbox) = setup();
    closed.wrangle_tabs(vec![tab(1), tab(2)], &mut ctx);

    let removed = closed.remove_tab(1, ctx.storage.as_mut()).unwrap();
    assert_eq!(removed.id, 1);
    assert_eq!(
        storage.peek(SAVED_TABS_KEY).unwrap(),
        serde_json::to_value(closed.tabs()).unwrap()
    );
    assert!(closed.remove_tab(1, ctx.storage.as_mut()).is_none());
}

#[test]
fn test_clear_deletes_persisted_copy() {
    let (mut closed, mut ctx, storage, _outbox) = setup();
    closed.wrangle_tabs(vec![tab(1)], &mut ctx);

    closed.clear(ctx.storage.as_mut());
    assert!(closed.is_empty());
    assert!(storage.peek(SAVED_TABS_KEY).is_none());
}

#[test]
fn test_replace_all_does_not_truncate() {
    let (mut closed, mut ctx, storage, _outbox) = setup();
    ctx.settings.set(MAX_TABS, json!(2)).unwrap();

    closed.replace_all(vec![tab(1), tab(2), tab(3)], ctx.storage.as_mut());
    assert_eq!(closed.len(), 3);
    assert_eq!(storage.peek(SAVED_TABS_KEY).unwrap().as_array().unwrap().len(), 3);
}
