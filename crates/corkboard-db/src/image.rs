//! Whole-database byte images, via SQLite's online backup API.
//!
//! The live database is in-memory; the snapshot store is its only
//! durability. Serialization goes through a scratch file because the backup
//! API copies between connections, not into a buffer. The scratch file is
//! removed on every path, success or not.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::backup::Backup;
use uuid::Uuid;

use crate::error::DbError;
use crate::{Database, migrations};

const PAGES_PER_STEP: std::ffi::c_int = 64;
const STEP_PAUSE: Duration = Duration::from_millis(5);

fn scratch_path() -> PathBuf {
    std::env::temp_dir().join(format!("corkboard-image-{}.sqlite", Uuid::new_v4()))
}

fn copy_database(src: &Connection, dst: &mut Connection) -> Result<(), DbError> {
    let backup = Backup::new(src, dst)?;
    backup.run_to_completion(PAGES_PER_STEP, STEP_PAUSE, None)?;
    Ok(())
}

impl Database {
    /// Serialize the current state to a byte image. Read-only against the
    /// live connection; safe to run while requests are being served.
    pub fn to_image(&self) -> Result<Vec<u8>, DbError> {
        let path = scratch_path();
        let copied = self.with_conn(|conn| {
            let mut dst = Connection::open(&path)?;
            copy_database(conn, &mut dst)
        });
        let bytes = copied.and_then(|_| std::fs::read(&path).map_err(DbError::from));
        let _ = std::fs::remove_file(&path);
        bytes
    }

    /// Construct a new instance from a previously serialized image.
    pub fn from_image(bytes: &[u8]) -> Result<Self, DbError> {
        let path = scratch_path();
        let loaded: Result<Self, DbError> = (|| {
            std::fs::write(&path, bytes)?;
            let src = Connection::open(&path)?;
            let mut conn = Connection::open_in_memory()?;
            copy_database(&src, &mut conn)?;
            // Schema creation is idempotent; covers images taken before a
            // schema change added a relation.
            migrations::run(&conn)?;
            Ok(Self {
                conn: Mutex::new(conn),
            })
        })();
        let _ = std::fs::remove_file(&path);
        loaded
    }
}
