use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::{SnapshotInfo, SnapshotStore, StoreError};

/// Directory under the root where blobs land before their atomic rename
/// into a group. Never treated as a group.
const STAGING_DIR: &str = ".incoming";

/// Filesystem-backed snapshot store.
///
/// Layout is `{root}/{group}/{cid}`, one flat file per blob, where the cid
/// is the SHA-256 hex of the contents. Writes stage under `.incoming` and
/// rename into place, so a group never contains a blob whose content
/// disagrees with its cid name. Creation time comes from file modification
/// time, which is stable because blobs are never rewritten.
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub async fn new(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root).await?;
        info!("Snapshot store root: {}", root.display());
        Ok(Self { root })
    }

    fn group_dir(&self, group: &str) -> PathBuf {
        self.root.join(group)
    }
}

fn content_id(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

async fn entry_created_at(path: &Path) -> Result<DateTime<Utc>, StoreError> {
    let meta = fs::metadata(path).await?;
    Ok(DateTime::<Utc>::from(meta.modified()?))
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn list(&self, group: &str) -> Result<Vec<SnapshotInfo>, StoreError> {
        let dir = self.group_dir(group);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // A group that was never written to is simply empty
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut snapshots = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(cid) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let created_at = entry_created_at(&entry.path()).await?;
            snapshots.push(SnapshotInfo { cid, created_at });
        }
        Ok(snapshots)
    }

    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, StoreError> {
        // cid lookup is group-agnostic; scan group directories for the blob
        let mut groups = fs::read_dir(&self.root).await?;
        while let Some(group) = groups.next_entry().await? {
            if group.file_name() == STAGING_DIR {
                continue;
            }
            let candidate = group.path().join(cid);
            match fs::read(&candidate).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::NotFound(cid.to_string()))
    }

    async fn put(&self, bytes: &[u8], group: &str) -> Result<SnapshotInfo, StoreError> {
        let dir = self.group_dir(group);
        fs::create_dir_all(&dir).await?;

        let cid = content_id(bytes);
        let path = dir.join(&cid);
        // Identical content already stored: keep the original blob and its
        // creation time
        if fs::try_exists(&path).await? {
            let created_at = entry_created_at(&path).await?;
            return Ok(SnapshotInfo { cid, created_at });
        }

        // Stage and rename: an interrupted write never leaves a blob whose
        // content does not match its cid name
        let staging = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging).await?;
        let tmp = staging.join(Uuid::new_v4().to_string());
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;

        let created_at = entry_created_at(&path).await?;
        info!("Stored snapshot {} in group {}", cid, group);
        Ok(SnapshotInfo { cid, created_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FsSnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path().join("snapshots"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_fetch_round_trips() {
        let (_dir, store) = store().await;
        let info = store.put(b"snapshot bytes", "g1").await.unwrap();
        assert_eq!(info.cid.len(), 64);

        let bytes = store.fetch(&info.cid).await.unwrap();
        assert_eq!(bytes, b"snapshot bytes");
    }

    #[tokio::test]
    async fn put_is_content_addressed() {
        let (_dir, store) = store().await;
        let a = store.put(b"same", "g1").await.unwrap();
        let b = store.put(b"same", "g1").await.unwrap();
        assert_eq!(a.cid, b.cid);

        let c = store.put(b"different", "g1").await.unwrap();
        assert_ne!(a.cid, c.cid);
    }

    #[tokio::test]
    async fn list_is_scoped_to_group() {
        let (_dir, store) = store().await;
        store.put(b"one", "g1").await.unwrap();
        store.put(b"two", "g1").await.unwrap();
        store.put(b"three", "g2").await.unwrap();

        assert_eq!(store.list("g1").await.unwrap().len(), 2);
        assert_eq!(store.list("g2").await.unwrap().len(), 1);
        assert!(store.list("never-written").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_leaves_no_stray_files() {
        let (_dir, store) = store().await;
        store.put(b"one", "g1").await.unwrap();
        store.put(b"two", "g1").await.unwrap();

        // Groups hold exactly the blobs put into them
        assert_eq!(store.list("g1").await.unwrap().len(), 2);

        // The staging area is drained by the rename
        let mut staged = fs::read_dir(store.root.join(STAGING_DIR)).await.unwrap();
        assert!(staged.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_unknown_cid_is_not_found() {
        let (_dir, store) = store().await;
        store.put(b"one", "g1").await.unwrap();
        let err = store.fetch("deadbeef").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
