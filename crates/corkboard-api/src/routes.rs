use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::attach_identity;
use crate::{AppState, admin, messages};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/messages/{id}",
            axum::routing::put(messages::update_message).delete(messages::delete_message),
        )
        .route("/backup", post(admin::backup))
        .route("/restore", post(admin::restore))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            attach_identity,
        ))
        .with_state(state)
}

async fn welcome() -> &'static str {
    "Welcome!"
}
