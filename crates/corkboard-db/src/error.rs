use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before any statement ran.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The targeted row does not exist (zero rows affected or returned).
    #[error("row not found")]
    NotFound,

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("image i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection lock poisoned")]
    LockPoisoned,
}
