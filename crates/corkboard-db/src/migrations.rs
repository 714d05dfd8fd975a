use rusqlite::Connection;
use tracing::info;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            note        TEXT NOT NULL,
            author      TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            pfp_url     TEXT,
            username    TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}
