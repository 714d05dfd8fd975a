pub mod fs;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use fs::FsSnapshotStore;

/// Metadata describing one stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Content identifier: lowercase SHA-256 hex of the blob.
    pub cid: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot {0} not found")]
    NotFound(String),

    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary to the external content-addressed blob store. Blobs are
/// immutable; groups namespace the snapshots of one logical database.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// All snapshots in a group, in no particular order.
    async fn list(&self, group: &str) -> Result<Vec<SnapshotInfo>, StoreError>;

    /// Raw bytes of a snapshot by content identifier.
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, StoreError>;

    /// Store a blob under a group, returning its descriptor. Re-putting
    /// identical bytes yields the same cid.
    async fn put(&self, bytes: &[u8], group: &str) -> Result<SnapshotInfo, StoreError>;
}

impl SnapshotInfo {
    /// Most recent snapshot, ties broken by highest cid so the choice is
    /// deterministic when two snapshots carry the same timestamp.
    pub fn latest(snapshots: Vec<SnapshotInfo>) -> Option<SnapshotInfo> {
        snapshots
            .into_iter()
            .max_by(|a, b| (a.created_at, &a.cid).cmp(&(b.created_at, &b.cid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info(cid: &str, secs: i64) -> SnapshotInfo {
        SnapshotInfo {
            cid: cid.to_string(),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn latest_picks_most_recent() {
        let picked = SnapshotInfo::latest(vec![info("aa", 10), info("bb", 30), info("cc", 20)]);
        assert_eq!(picked.unwrap().cid, "bb");
    }

    #[test]
    fn latest_breaks_timestamp_ties_by_cid() {
        let picked = SnapshotInfo::latest(vec![info("aa", 10), info("bb", 10)]);
        assert_eq!(picked.unwrap().cid, "bb");
    }

    #[test]
    fn latest_of_empty_is_none() {
        assert_eq!(SnapshotInfo::latest(vec![]), None);
    }
}
