use tabwrangler::types::errors::*;

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::DatabaseError("disk full".to_string()).to_string(),
        "Storage database error: disk full"
    );
    assert_eq!(
        StorageError::SerializationError("savedTabs: bad".to_string()).to_string(),
        "Storage serialization error: savedTabs: bad"
    );
}

#[test]
fn storage_error_from_rusqlite() {
    let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, StorageError::DatabaseError(_)));
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("maxTabs".to_string()).to_string(),
        "Invalid settings value: maxTabs"
    );
    assert_eq!(
        SettingsError::IoError("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
}

// === HostError Tests ===

#[test]
fn host_error_display_variants() {
    let err = HostError::RemoveFailed { tab_id: 7, reason: "gone".to_string() };
    assert_eq!(err.to_string(), "Host refused to close tab 7: gone");

    let err = HostError::CreateFailed {
        url: Some("https://a.dev".to_string()),
        reason: "blocked".to_string(),
    };
    assert_eq!(err.to_string(), "Host refused to create tab for Some(\"https://a.dev\"): blocked");
}

// === BackupError Tests ===

#[test]
fn backup_error_user_facing_messages() {
    assert_eq!(BackupError::NothingToImport.to_string(), "Nothing to import");
    assert_eq!(BackupError::InvalidBackup.to_string(), "Invalid backup");
}

// === WranglerError Tests ===

#[test]
fn wrangler_error_is_transparent_over_sources() {
    let err: WranglerError = BackupError::InvalidBackup.into();
    assert_eq!(err.to_string(), "Invalid backup");

    let err: WranglerError = SettingsError::InvalidKey("x".to_string()).into();
    assert_eq!(err.to_string(), "Invalid settings key: x");

    let err: WranglerError = StorageError::DatabaseError("locked".to_string()).into();
    assert_eq!(err.to_string(), "Storage database error: locked");
}

#[test]
fn wrangler_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(WranglerError::InvalidTabId("\"7\"".to_string()));
    assert_eq!(err.to_string(), "Invalid tab id: \"7\"");
}
