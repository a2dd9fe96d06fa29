use thiserror::Error;

use super::tab::TabId;

// === StorageError ===

/// Errors from the key-value persistence primitive.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing database rejected the operation.
    #[error("Storage database error: {0}")]
    DatabaseError(String),
    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    SerializationError(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === HostError ===

/// A host tab operation was refused. Batches record these and keep going.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Host refused to close tab {tab_id}: {reason}")]
    RemoveFailed { tab_id: TabId, reason: String },
    #[error("Host refused to create tab for {url:?}: {reason}")]
    CreateFailed { url: Option<String>, reason: String },
}

// === BackupError ===

/// Errors related to importing or exporting a backup.
#[derive(Debug, Error)]
pub enum BackupError {
    /// No file contents were supplied.
    #[error("Nothing to import")]
    NothingToImport,
    /// The parsed object does not look like an export.
    #[error("Invalid backup")]
    InvalidBackup,
    /// The file is not valid JSON or a field has the wrong shape.
    #[error("Backup parse error: {0}")]
    ParseError(String),
    /// The export could not be serialized.
    #[error("Backup serialization error: {0}")]
    SerializationError(String),
}

// === WranglerError ===

/// Top-level error for coordinator commands.
#[derive(Debug, Error)]
pub enum WranglerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    /// A tab id was missing or not an integer.
    #[error("Invalid tab id: {0}")]
    InvalidTabId(String),
}
