use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Identity --

/// JWT claims attached by the identity middleware. `sub` is the opaque user
/// id handed out by the identity provider; it is the ownership anchor on
/// every message a user creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub note: String,
    pub author: String,
    pub pfp_url: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub note: String,
    pub author: String,
    pub user_id: String,
    pub pfp_url: Option<String>,
    pub username: Option<String>,
    pub created_at: String,
}

// -- Admin --

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub cid: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    /// `created_at` of the restored snapshot, or "fresh" when the store was
    /// empty and a new database was initialized.
    pub status: String,
}
