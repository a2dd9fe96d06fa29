//! Backup import/export.
//!
//! An export is one JSON object holding the archive and the three counters.
//! Import is all-or-nothing: the file is parsed and validated completely
//! before the caller applies anything.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::backup::{ExportBundle, ImportBundle};
use crate::types::errors::BackupError;
use crate::types::settings::{TOTAL_TABS_REMOVED, TOTAL_TABS_UNWRANGLED, TOTAL_TABS_WRANGLED};

const SAVED_TABS: &str = "savedTabs";

/// A backup must carry at least this many top-level keys.
pub const MIN_BACKUP_KEYS: usize = 4;

/// `TabWranglerExport-M-D-YYYY.json`, the US short date with dashes.
pub fn export_file_name(date: NaiveDate) -> String {
    let locale_date = date.format("%-m/%-d/%Y").to_string().replace('/', "-");
    format!("TabWranglerExport-{}.json", locale_date)
}

pub fn to_json(bundle: &ExportBundle) -> Result<String, BackupError> {
    serde_json::to_string(bundle).map_err(|e| BackupError::SerializationError(e.to_string()))
}

/// Parses and validates backup file contents.
///
/// # Errors
/// - `NothingToImport` for empty contents
/// - `ParseError` for invalid JSON or a field of the wrong shape
/// - `InvalidBackup` when the top level is not an object with at least
///   [`MIN_BACKUP_KEYS`] keys
pub fn parse_backup(contents: &str) -> Result<ImportBundle, BackupError> {
    if contents.trim().is_empty() {
        return Err(BackupError::NothingToImport);
    }

    let json: Value =
        serde_json::from_str(contents).map_err(|e| BackupError::ParseError(e.to_string()))?;
    let object = match json {
        Value::Object(map) if map.len() >= MIN_BACKUP_KEYS => map,
        _ => return Err(BackupError::InvalidBackup),
    };

    Ok(ImportBundle {
        saved_tabs: field(&object, SAVED_TABS)?,
        total_tabs_removed: field(&object, TOTAL_TABS_REMOVED)?,
        total_tabs_unwrangled: field(&object, TOTAL_TABS_UNWRANGLED)?,
        total_tabs_wrangled: field(&object, TOTAL_TABS_WRANGLED)?,
    })
}

/// Absent and `null` fields both come back as `None`.
fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Result<Option<T>, BackupError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| BackupError::ParseError(format!("{}: {}", key, e))),
    }
}
