//! RPC method handler for the Tab Wrangler JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! turns one inbound host command into a call on [`TabWrangler`]; host
//! instructions produced along the way go to the wrangler's outbox.

use std::sync::Mutex;

use chrono::Local;
use serde_json::{json, Value};

use crate::app::TabWrangler;
use crate::managers::activity_tracker::ActivityTrackerTrait;
use crate::managers::closed_tabs::{UnwrangleReport, WrangleReport};
use crate::services::backup;
use crate::services::tab_filter::{self, TabFilter};
use crate::types::errors::WranglerError;
use crate::types::tab::{tab_id_from_json, TabId, TabRecord, TabRef};

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(wrangler: &Mutex<TabWrangler>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Activity ───
        "tabs.init" => {
            let tabs = param_tabs(params, "tabs")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.init_tabs(&tabs);
            Ok(json!({"tracked": w.tracker().len()}))
        }
        "tab.accessed" => {
            let target = params
                .get("tab")
                .or_else(|| params.get("tabId"))
                .ok_or("missing tab")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            let tab_id = w
                .tab_accessed(TabRef::Json(target))
                .ok_or_else(|| WranglerError::InvalidTabId(target.to_string()).to_string())?;
            Ok(json!({"tabId": tab_id}))
        }
        "tab.removed" => {
            let tab_id = param_id(params, "tabId")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.tab_removed(tab_id);
            Ok(json!({"ok": true}))
        }

        // ─── Wrangling ───
        "wrangle.tick" => {
            let open_tabs = param_tabs(params, "openTabs")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            let report = w.wrangle_idle_tabs(&open_tabs);
            Ok(wrangle_report_json(&report))
        }
        "wrangle.tabs" => {
            let tabs = param_tabs(params, "tabs")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            let report = w.wrangle(tabs);
            Ok(wrangle_report_json(&report))
        }

        // ─── Closed tabs ───
        "closedTabs.list" => {
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(w.saved_tabs()).map_err(|e| e.to_string())
        }
        "closedTabs.search" => {
            let mut filters: Vec<TabFilter> = Vec::new();
            if let Some(keyword) = params.get("keyword").and_then(|v| v.as_str()) {
                filters.push(tab_filter::keyword(keyword));
            }
            if let Some(url) = params.get("url").and_then(|v| v.as_str()) {
                filters.push(tab_filter::exact_url(url));
            }
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            let found = w.search(&filters);
            serde_json::to_value(found).map_err(|e| e.to_string())
        }
        "closedTabs.unwrangle" => {
            let ids = params
                .get("tabIds")
                .and_then(|v| v.as_array())
                .ok_or("missing tabIds")?
                .iter()
                .map(|v| tab_id_from_json(v).ok_or_else(|| WranglerError::InvalidTabId(v.to_string()).to_string()))
                .collect::<Result<Vec<TabId>, String>>()?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            let report = w.unwrangle_ids(&ids);
            Ok(unwrangle_report_json(&report))
        }
        "closedTabs.remove" => {
            let tab_id = param_id(params, "tabId")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            let removed = w.remove_saved_tab(tab_id);
            Ok(json!({"removed": removed.is_some()}))
        }
        "closedTabs.clear" => {
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.clear_saved_tabs();
            Ok(json!({"ok": true}))
        }

        // ─── Locks & whitelist ───
        "tab.lock" => {
            let tab_id = param_id(params, "tabId")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.lock_tab(tab_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.unlock" => {
            let tab_id = param_id(params, "tabId")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.unlock_tab(tab_id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.isLocked" => {
            let tab_id = param_id(params, "tabId")?;
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            Ok(json!({"locked": w.is_locked(tab_id)}))
        }
        "whitelist.match" => {
            let url = params.get("url").and_then(|v| v.as_str()).ok_or("missing url")?;
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            Ok(json!({"match": w.whitelist_match(url)}))
        }

        // ─── Settings & stats ───
        "settings.get" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            w.settings()
                .get(key)
                .ok_or_else(|| format!("unknown settings key: {}", key))
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.settings_mut().set(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "stats.get" => {
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(w.counters()).map_err(|e| e.to_string())
        }

        // ─── Backup ───
        "backup.export" => {
            let w = wrangler.lock().map_err(|e| e.to_string())?;
            let data = backup::to_json(&w.export_backup()).map_err(|e| e.to_string())?;
            let file_name = backup::export_file_name(Local::now().date_naive());
            Ok(json!({"fileName": file_name, "data": data}))
        }
        "backup.import" => {
            let data = params.get("data").and_then(|v| v.as_str()).unwrap_or("");
            let mut w = wrangler.lock().map_err(|e| e.to_string())?;
            w.import_backup(data).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

fn param_id(params: &Value, key: &str) -> Result<TabId, String> {
    let value = params.get(key).ok_or_else(|| format!("missing {}", key))?;
    tab_id_from_json(value).ok_or_else(|| WranglerError::InvalidTabId(value.to_string()).to_string())
}

fn param_tabs(params: &Value, key: &str) -> Result<Vec<TabRecord>, String> {
    let value = params.get(key).cloned().ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", key, e))
}

fn wrangle_report_json(report: &WrangleReport) -> Value {
    json!({
        "wrangled": report.wrangled,
        "evicted": report.evicted.iter().map(|t| t.id).collect::<Vec<_>>(),
        "failures": report.failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    })
}

fn unwrangle_report_json(report: &UnwrangleReport) -> Value {
    json!({
        "restored": report.restored,
        "counted": report.counted,
        "failures": report.failures.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    })
}
