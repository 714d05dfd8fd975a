use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use corkboard_types::api::Claims;

use crate::AppState;
use crate::error::ApiError;

/// The caller's identity, if any. Inserted by [`attach_identity`] on every
/// request so handlers always find it in extensions.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Claims>);

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|c| c.sub.as_str())
    }
}

/// Header carrying the admin shared secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Extract and validate the bearer JWT when present.
///
/// A missing Authorization header means anonymous — reads are public, so
/// the gate decides later whether that is enough. A header that is present
/// but malformed or failing validation is rejected here.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match req.headers().get(header::AUTHORIZATION) {
        None => Identity(None),
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(ApiError::Unauthenticated)?;

            let data = decode::<Claims>(
                token,
                &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|_| ApiError::Unauthenticated)?;

            Identity(Some(data.claims))
        }
    };

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// The raw admin credential from the request, if any.
pub fn presented_admin_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok())
}
