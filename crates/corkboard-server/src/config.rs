use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveTime;

/// Process configuration, read once from the environment at startup.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub admin_token: Option<String>,
    pub snapshot_dir: PathBuf,
    pub snapshot_group: String,
    /// Daily backup time, UTC.
    pub backup_time: NaiveTime,
    pub owner_update: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("CORKBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("CORKBOARD_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("CORKBOARD_PORT is not a port number")?;

        let jwt_secret = std::env::var("CORKBOARD_JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-me".into());
        let admin_token = std::env::var("CORKBOARD_ADMIN_TOKEN").ok();

        let snapshot_dir = std::env::var("CORKBOARD_SNAPSHOT_DIR")
            .unwrap_or_else(|_| "snapshots".into())
            .into();
        let snapshot_group =
            std::env::var("CORKBOARD_SNAPSHOT_GROUP").unwrap_or_else(|_| "corkboard".into());

        let backup_time = std::env::var("CORKBOARD_BACKUP_TIME")
            .unwrap_or_else(|_| "03:00".into());
        let backup_time = NaiveTime::parse_from_str(&backup_time, "%H:%M")
            .context("CORKBOARD_BACKUP_TIME must be HH:MM")?;

        let owner_update = std::env::var("CORKBOARD_OWNER_UPDATE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            jwt_secret,
            admin_token,
            snapshot_dir,
            snapshot_group,
            backup_time,
            owner_update,
        })
    }
}
