//! Host capabilities.
//!
//! The core never talks to a browser directly. Closing and creating tabs,
//! rendering the badge, and reading the time are capabilities injected
//! through [`Context`], so every component can run without a live host.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

use crate::database::Storage;
use crate::services::settings_engine::SettingsStore;
use crate::types::errors::HostError;
use crate::types::tab::TabId;

/// Tab primitives of the host browser.
pub trait TabHost {
    fn remove_tab(&mut self, tab_id: TabId) -> Result<(), HostError>;
    fn create_tab(&mut self, url: Option<&str>, active: bool) -> Result<(), HostError>;
}

/// Badge rendering primitive. An empty string hides the badge.
pub trait BadgeSink {
    fn set_badge_text(&mut self, text: &str);
}

/// Source of "now" in milliseconds since epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Everything a component may touch outside its own state.
pub struct Context {
    pub settings: Box<dyn SettingsStore>,
    pub storage: Box<dyn Storage>,
    pub host: Box<dyn TabHost>,
    pub badge: Box<dyn BadgeSink>,
    pub clock: Arc<dyn Clock>,
}

impl Context {
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }
}

/// Queues host instructions as JSON events for a remote host to execute.
///
/// Clones share the queue: the RPC server keeps one handle to drain and
/// print while the wrangler owns the others.
#[derive(Debug, Clone, Default)]
pub struct EventOutbox {
    events: Arc<Mutex<Vec<Value>>>,
}

impl EventOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all queued events in emission order.
    pub fn drain(&self) -> Vec<Value> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        }
    }

    fn push(&self, event: Value) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl TabHost for EventOutbox {
    fn remove_tab(&mut self, tab_id: TabId) -> Result<(), HostError> {
        self.push(json!({"event": "tabs.remove", "tabId": tab_id}));
        Ok(())
    }

    fn create_tab(&mut self, url: Option<&str>, active: bool) -> Result<(), HostError> {
        self.push(json!({"event": "tabs.create", "url": url, "active": active}));
        Ok(())
    }
}

impl BadgeSink for EventOutbox {
    fn set_badge_text(&mut self, text: &str) {
        self.push(json!({"event": "badge.setText", "text": text}));
    }
}
