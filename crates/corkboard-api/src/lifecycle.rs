//! The database lifecycle manager: owns the process's single live database
//! instance and moves it through restore and backup.
//!
//! The live reference sits behind an `RwLock`. Handlers resolve it exactly
//! once per request and keep that `Arc` for the whole request, so a restore
//! swapping the pointer mid-request never splits a request across two
//! instances; in-flight work finishes against the outgoing one.
//!
//! Every snapshot-store call is bounded by a timeout; an elapsed timer is a
//! failure of that call, never a hang of the boot, a restore, or the
//! scheduler tick.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use corkboard_db::{Database, DbError};
use corkboard_store::{SnapshotInfo, SnapshotStore};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Restore(String),

    #[error("{0}")]
    Backup(String),
}

/// Status string for a fresh (non-restored) instance.
pub const FRESH: &str = "fresh";

/// Upper bound on any single snapshot-store call.
const STORE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct LifecycleManager {
    live: RwLock<Arc<Database>>,
    store: Arc<dyn SnapshotStore>,
    group: String,
    // Serializes backups with each other; requests hitting a held gate are
    // rejected, not queued
    backup_gate: Mutex<()>,
    // Seam for the fresh-init fallback; production always uses in_memory
    fresh_init: fn() -> Result<Database, DbError>,
    store_timeout: Duration,
}

impl LifecycleManager {
    fn new(db: Database, store: Arc<dyn SnapshotStore>, group: String) -> Self {
        Self {
            live: RwLock::new(Arc::new(db)),
            store,
            group,
            backup_gate: Mutex::new(()),
            fresh_init: Database::in_memory,
            store_timeout: STORE_CALL_TIMEOUT,
        }
    }

    /// Boot-time construction: restore the most recent snapshot in the
    /// group, or fall back to a fresh empty database. The returned status
    /// is the restored snapshot's `created_at`, or [`FRESH`].
    ///
    /// Only a failure to create even the fresh instance is surfaced; the
    /// process cannot serve without a database.
    pub async fn initialize(
        store: Arc<dyn SnapshotStore>,
        group: String,
    ) -> Result<(Self, String), LifecycleError> {
        let (db, status) = match load_latest(store.as_ref(), &group, STORE_CALL_TIMEOUT).await {
            Some(loaded) => loaded,
            None => (fresh_database(Database::in_memory).await?, FRESH.to_string()),
        };
        info!("Live database ready ({})", status);
        Ok((Self::new(db, store, group), status))
    }

    /// The current live instance. Callers must resolve this once per
    /// request and use the returned handle throughout.
    pub async fn live(&self) -> Arc<Database> {
        self.live.read().await.clone()
    }

    /// On-demand restore: re-run the boot selection and atomically swap the
    /// live reference. On failure the previous instance stays live.
    pub async fn restore(&self) -> Result<String, LifecycleError> {
        let loaded = load_latest(self.store.as_ref(), &self.group, self.store_timeout).await;
        let (db, status) = match loaded {
            Some(loaded) => loaded,
            None => (fresh_database(self.fresh_init).await?, FRESH.to_string()),
        };
        *self.live.write().await = Arc::new(db);
        info!("Live database replaced ({})", status);
        Ok(status)
    }

    /// Serialize the live instance and upload it to the snapshot store.
    /// Read-only against the live database; a failure here never disturbs
    /// it. A backup requested while one is running is rejected.
    pub async fn backup(&self) -> Result<SnapshotInfo, LifecycleError> {
        let _gate = self
            .backup_gate
            .try_lock()
            .map_err(|_| LifecycleError::Backup("a backup is already running".into()))?;

        let db = self.live().await;
        let image = tokio::task::spawn_blocking(move || db.to_image())
            .await
            .map_err(|e| LifecycleError::Backup(format!("serialize task failed: {e}")))?
            .map_err(|e| LifecycleError::Backup(format!("serialize failed: {e}")))?;

        let snapshot = match timeout(self.store_timeout, self.store.put(&image, &self.group)).await
        {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => return Err(LifecycleError::Backup(format!("upload failed: {e}"))),
            Err(_) => return Err(LifecycleError::Backup("upload timed out".into())),
        };

        info!(
            "Backup complete: {} ({} bytes)",
            snapshot.cid,
            image.len()
        );
        Ok(snapshot)
    }
}

async fn fresh_database(init: fn() -> Result<Database, DbError>) -> Result<Database, LifecycleError> {
    tokio::task::spawn_blocking(init)
        .await
        .map_err(|e| LifecycleError::Restore(format!("init task failed: {e}")))?
        .map_err(|e| LifecycleError::Restore(format!("fresh initialization failed: {e}")))
}

/// Select and load the most recent snapshot in the group. Any failure along
/// the way (listing, fetch, load, or a timed-out store call) is logged and
/// treated as "no snapshot", which callers answer with fresh initialization.
async fn load_latest(
    store: &dyn SnapshotStore,
    group: &str,
    bound: Duration,
) -> Option<(Database, String)> {
    let snapshots = match timeout(bound, store.list(group)).await {
        Ok(Ok(snapshots)) => snapshots,
        Ok(Err(e)) => {
            warn!("Snapshot listing failed for group {}: {}", group, e);
            return None;
        }
        Err(_) => {
            warn!("Snapshot listing timed out for group {}", group);
            return None;
        }
    };

    let latest = SnapshotInfo::latest(snapshots)?;

    let bytes = match timeout(bound, store.fetch(&latest.cid)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!("Snapshot fetch failed for {}: {}", latest.cid, e);
            return None;
        }
        Err(_) => {
            warn!("Snapshot fetch timed out for {}", latest.cid);
            return None;
        }
    };

    let loaded = tokio::task::spawn_blocking(move || Database::from_image(&bytes))
        .await
        .ok()?;
    match loaded {
        Ok(db) => Some((db, latest.created_at.to_rfc3339())),
        Err(e) => {
            warn!("Snapshot {} failed to load: {}", latest.cid, e);
            None
        }
    }
}
