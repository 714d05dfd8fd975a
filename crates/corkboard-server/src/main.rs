mod config;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use corkboard_api::authz::Policy;
use corkboard_api::lifecycle::LifecycleManager;
use corkboard_api::routes::router;
use corkboard_api::{AppState, AppStateInner};
use corkboard_store::FsSnapshotStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corkboard=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.admin_token.is_none() {
        info!("No admin token configured; backup/restore endpoints are disabled");
    }

    // Boot: restore the latest snapshot or start fresh
    let store = Arc::new(FsSnapshotStore::new(config.snapshot_dir.clone()).await?);
    let (lifecycle, status) =
        LifecycleManager::initialize(store, config.snapshot_group.clone()).await?;
    info!("Database lifecycle initialized: {}", status);

    let state: AppState = Arc::new(AppStateInner {
        lifecycle,
        jwt_secret: config.jwt_secret.clone(),
        admin_token: config.admin_token.clone(),
        policy: Policy {
            owner_update: config.owner_update,
        },
    });

    scheduler::spawn_daily_backup(state.clone(), config.backup_time);

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Corkboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
