//! Tab Wrangler persistence layer.
//!
//! SQLite connection management, schema migrations, and the key-value
//! [`Storage`] contract the archive persists through.
//!
//! # Usage
//!
//! ```no_run
//! use serde_json::json;
//! use tabwrangler::database::{Database, SqliteStorage, Storage};
//!
//! let db = Database::open("tabwrangler.db").expect("failed to open database");
//! let mut storage = SqliteStorage::new(db);
//! storage.set("savedTabs", &json!([])).expect("write failed");
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::{MemoryStorage, SqliteStorage, Storage};
