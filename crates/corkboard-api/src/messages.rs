use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;

use corkboard_db::models::MessageRow;
use corkboard_types::api::{CreateMessageRequest, MessageResponse, UpdateMessageRequest};

use crate::AppState;
use crate::authz::{Operation, authorize, authorize_as};
use crate::error::ApiError;
use crate::middleware::{Identity, presented_admin_token};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

fn to_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: row.id,
        note: row.note,
        author: row.author,
        user_id: row.user_id,
        pfp_url: row.pfp_url,
        username: row.username,
        created_at: row.created_at,
    }
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::Internal
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.lifecycle.live().await;
    let limit = query.limit.clamp(1, 200);

    // Run blocking DB work off the async runtime
    let rows = tokio::task::spawn_blocking(move || db.list_messages(limit))
        .await
        .map_err(join_error)??;

    Ok(Json(rows.into_iter().map(to_response).collect::<Vec<_>>()))
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id =
        authorize_as(state.policy, identity.user_id(), false, Operation::Create)?.to_string();

    let db = state.lifecycle.live().await;
    let row = tokio::task::spawn_blocking(move || {
        db.create_message(
            &req.note,
            &req.author,
            &user_id,
            req.pfp_url.as_deref(),
            req.username.as_deref(),
        )
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // One instance for the whole request, owner lookup included
    let db = state.lifecycle.live().await;

    // Not-found resolves before authorization
    let lookup = db.clone();
    let owner = tokio::task::spawn_blocking(move || lookup.message_owner(id))
        .await
        .map_err(join_error)??;

    authorize(
        state.policy,
        identity.user_id(),
        false,
        Operation::Update { owner: &owner },
    )?;

    let row = tokio::task::spawn_blocking(move || db.update_note(id, &req.note))
        .await
        .map_err(join_error)??;

    Ok(Json(to_response(row)))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.lifecycle.live().await;

    let lookup = db.clone();
    let owner = tokio::task::spawn_blocking(move || lookup.message_owner(id))
        .await
        .map_err(join_error)??;

    let admin = state.is_admin(presented_admin_token(&headers));
    authorize(
        state.policy,
        identity.user_id(),
        admin,
        Operation::Delete { owner: &owner },
    )?;

    tokio::task::spawn_blocking(move || db.delete_message(id))
        .await
        .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
