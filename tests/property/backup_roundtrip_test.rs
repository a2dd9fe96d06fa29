//! Property-based tests for backup export/import.
//!
//! For any archive and counters, importing an export restores the same
//! archive and counters, and a rejected import leaves everything untouched.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use tabwrangler::app::TabWrangler;
use tabwrangler::database::MemoryStorage;
use tabwrangler::host::{Context, EventOutbox, ManualClock};
use tabwrangler::services::backup::to_json;
use tabwrangler::services::settings_engine::SettingsEngine;
use tabwrangler::types::backup::ExportBundle;
use tabwrangler::types::settings::WranglerSettings;
use tabwrangler::types::tab::TabRecord;

fn wrangler() -> TabWrangler {
    let outbox = EventOutbox::new();
    let ctx = Context {
        settings: Box::new(SettingsEngine::in_memory(WranglerSettings::default())),
        storage: Box::new(MemoryStorage::new()),
        host: Box::new(outbox.clone()),
        badge: Box::new(outbox),
        clock: Arc::new(ManualClock::new(1_000)),
    };
    let mut wrangler = TabWrangler::new(ctx);
    wrangler.init().unwrap();
    wrangler
}

fn arb_tab() -> impl Strategy<Value = TabRecord> {
    (
        1..10_000i64,
        prop::option::of("https://[a-z]{1,10}\\.dev/[a-z0-9]{0,8}"),
        prop::option::of("[A-Za-z ]{0,20}"),
        prop::option::of(0..2_000_000_000_000i64),
        prop::option::of("[a-z]{1,8}\\.png"),
    )
        .prop_map(|(id, url, title, closed_at, icon)| {
            let mut tab = TabRecord::new(id, url.as_deref(), title.as_deref());
            tab.closed_at = closed_at;
            if let Some(icon) = icon {
                tab.extra.insert("favIconUrl".to_string(), json!(icon));
            }
            tab
        })
}

fn arb_bundle() -> impl Strategy<Value = ExportBundle> {
    (
        prop::collection::vec(arb_tab(), 0..30),
        0..1_000_000u64,
        0..1_000_000u64,
        0..1_000_000u64,
    )
        .prop_map(|(saved_tabs, removed, unwrangled, wrangled)| ExportBundle {
            saved_tabs,
            total_tabs_removed: removed,
            total_tabs_unwrangled: unwrangled,
            total_tabs_wrangled: wrangled,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn import_of_export_restores_state(bundle in arb_bundle()) {
        let mut w = wrangler();
        w.import_backup(&to_json(&bundle).unwrap()).unwrap();
        prop_assert_eq!(w.export_backup(), bundle.clone());

        let mut other = wrangler();
        other.import_backup(&to_json(&w.export_backup()).unwrap()).unwrap();
        prop_assert_eq!(other.export_backup(), bundle);
    }

    #[test]
    fn rejected_import_leaves_state_untouched(bundle in arb_bundle(), keys in 0..4usize) {
        let mut w = wrangler();
        w.import_backup(&to_json(&bundle).unwrap()).unwrap();

        let partial: serde_json::Map<String, serde_json::Value> = (0..keys)
            .map(|i| (format!("k{}", i), json!(i)))
            .collect();
        let contents = serde_json::Value::Object(partial).to_string();

        prop_assert!(w.import_backup(&contents).is_err());
        prop_assert_eq!(w.export_backup(), bundle);
    }
}
