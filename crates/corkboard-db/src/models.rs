/// Database row types — these map directly to SQLite rows.
/// Distinct from corkboard-types API models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: i64,
    pub note: String,
    pub author: String,
    pub user_id: String,
    pub pfp_url: Option<String>,
    pub username: Option<String>,
    pub created_at: String,
}
