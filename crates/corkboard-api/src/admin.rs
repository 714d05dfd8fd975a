use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};
use tracing::warn;

use corkboard_types::api::{BackupResponse, RestoreResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::presented_admin_token;

/// Admin endpoints take only the shared-secret header; identity tokens grant
/// nothing here. A missing header is unauthenticated, a wrong one (or a
/// deployment with no admin token configured) is unauthorized.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    match presented_admin_token(headers) {
        None => Err(ApiError::Unauthenticated),
        Some(token) if state.is_admin(Some(token)) => Ok(()),
        Some(_) => {
            warn!("Admin operation rejected: bad credential");
            Err(ApiError::Unauthorized)
        }
    }
}

pub async fn backup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let snapshot = state.lifecycle.backup().await?;
    Ok(Json(BackupResponse {
        cid: snapshot.cid,
        created_at: snapshot.created_at,
    }))
}

pub async fn restore(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let status = state.lifecycle.restore().await?;
    Ok(Json(RestoreResponse { status }))
}
