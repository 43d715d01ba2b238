//! Database module for ModHub
//!
//! One repository file per entity family: users/roles, modules/versions,
//! reviews/compatibility reports, categories/tags.

mod catalog;
mod modules;
mod reviews;
mod schema;
mod users;

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;

/// Database wrapper shared across handlers
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        // Initialize schema and seed the fixed roles
        schema::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get a connection for operations
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Current timestamp as RFC 3339. Written from Rust rather than SQL so
/// idempotence checks can compare timestamps at subsecond precision.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}
