use rusqlite::{OptionalExtension, Row};

use crate::Database;
use crate::error::DbError;
use crate::models::MessageRow;

/// Hard cap on the message body; anything longer is rejected before a
/// statement runs.
pub const MAX_NOTE_CHARS: usize = 1000;

const MESSAGE_COLUMNS: &str = "id, note, author, user_id, pfp_url, username, created_at";

fn validate_note(note: &str) -> Result<(), DbError> {
    if note.trim().is_empty() {
        return Err(DbError::Validation("note must not be empty".into()));
    }
    if note.chars().count() > MAX_NOTE_CHARS {
        return Err(DbError::Validation(format!(
            "note exceeds {} characters",
            MAX_NOTE_CHARS
        )));
    }
    Ok(())
}

fn read_message(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        note: row.get(1)?,
        author: row.get(2)?,
        user_id: row.get(3)?,
        pfp_url: row.get(4)?,
        username: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Most recent messages first, capped at `limit`.
    pub fn list_messages(&self, limit: u32) -> Result<Vec<MessageRow>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY id DESC LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map([limit], read_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert one message and return the stored row, id assigned by the
    /// engine. `user_id` is written here and never again.
    pub fn create_message(
        &self,
        note: &str,
        author: &str,
        user_id: &str,
        pfp_url: Option<&str>,
        username: Option<&str>,
    ) -> Result<MessageRow, DbError> {
        validate_note(note)?;
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO messages (note, author, user_id, pfp_url, username)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                rusqlite::params![note, author, user_id, pfp_url, username],
                read_message,
            )?;
            Ok(row)
        })
    }

    /// Replace the note on an existing message. Ownership metadata is left
    /// untouched by the statement itself, not just by convention.
    pub fn update_note(&self, id: i64, note: &str) -> Result<MessageRow, DbError> {
        validate_note(note)?;
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE messages SET note = ?1 WHERE id = ?2 RETURNING {MESSAGE_COLUMNS}"
                ),
                rusqlite::params![note, id],
                read_message,
            )
            .optional()?
            .ok_or(DbError::NotFound)
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            if affected == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    /// Recorded owner of a message, for the authorization gate. NotFound is
    /// resolved here, before any authorization decision.
    pub fn message_owner(&self, id: i64) -> Result<String, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT user_id FROM messages WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(DbError::NotFound)
        })
    }
}
