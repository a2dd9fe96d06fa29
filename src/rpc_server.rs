//! Tab Wrangler RPC server: JSON-RPC over stdin/stdout for a browser-extension host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"wrangle.tick", "params":{"openTabs":[...]}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Host instructions produced while handling a request are written as
//! `{"event":...}` lines before its response.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tabwrangler::app::TabWrangler;
use tabwrangler::database::{Database, SqliteStorage};
use tabwrangler::host::{Context, EventOutbox, SystemClock};
use tabwrangler::rpc_handler::handle_method;
use tabwrangler::services::settings_engine::SettingsEngine;

fn data_dir() -> PathBuf {
    std::env::var("TABWRANGLER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn build_wrangler(outbox: &EventOutbox) -> Result<TabWrangler, String> {
    let dir = data_dir();

    let mut settings = SettingsEngine::new(Some(dir.join("settings.json")));
    settings.load().map_err(|e| format!("failed to load settings: {}", e))?;

    let db = Database::open(dir.join("tabwrangler.db"))
        .map_err(|e| format!("failed to open database: {}", e))?;

    let ctx = Context {
        settings: Box::new(settings),
        storage: Box::new(SqliteStorage::new(db)),
        host: Box::new(outbox.clone()),
        badge: Box::new(outbox.clone()),
        clock: Arc::new(SystemClock),
    };
    let mut wrangler = TabWrangler::new(ctx);
    wrangler.init().map_err(|e| format!("failed to load archive: {}", e))?;
    Ok(wrangler)
}

fn emit(out: &mut impl Write, value: &Value) {
    if writeln!(out, "{}", value).and_then(|_| out.flush()).is_err() {
        warn!("failed to write to stdout");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TABWRANGLER_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let outbox = EventOutbox::new();
    let wrangler = match build_wrangler(&outbox) {
        Ok(w) => Mutex::new(w),
        Err(e) => {
            error!(error = %e, "failed to initialize tab wrangler");
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Startup may already have queued a badge update.
    for event in outbox.drain() {
        emit(&mut out, &event);
    }
    emit(&mut out, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}));
    info!(version = env!("CARGO_PKG_VERSION"), "rpc server listening on stdin");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                emit(&mut out, &json!({"id":null,"error":format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let result = handle_method(&wrangler, method, &params);
        if let Err(ref e) = result {
            warn!(method, error = %e, "rpc call failed");
        }

        for event in outbox.drain() {
            emit(&mut out, &event);
        }
        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        emit(&mut out, &response);
    }
}
