use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use corkboard_api::AppState;

/// Fire a backup once per day at `at` (UTC). Failures are logged and
/// swallowed; the next tick is scheduled regardless.
pub fn spawn_daily_backup(state: AppState, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next(Utc::now(), at);
            info!("Next scheduled backup in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            match state.lifecycle.backup().await {
                Ok(snapshot) => info!("Scheduled backup stored {}", snapshot.cid),
                Err(e) => warn!("Scheduled backup failed: {}", e),
            }
        }
    })
}

fn until_next(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
