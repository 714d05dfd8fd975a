pub mod error;
pub mod image;
pub mod migrations;
pub mod models;
pub mod queries;

use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

pub use error::DbError;

/// The embedded database engine behind a single connection.
///
/// The whole database lives in memory; durability comes from the snapshot
/// store, not from a file on disk. A `Database` is immutable once handed out
/// (replaced wholesale on restore), so all callers share it through an `Arc`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Fresh, empty instance with the schema created.
    pub fn in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        info!("Fresh in-memory database initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }
}
