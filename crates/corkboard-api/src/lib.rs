pub mod admin;
pub mod authz;
pub mod error;
pub mod lifecycle;
pub mod messages;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::authz::Policy;
use crate::lifecycle::LifecycleManager;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub lifecycle: LifecycleManager,
    pub jwt_secret: String,
    /// Shared admin secret; `None` disables admin operations entirely.
    pub admin_token: Option<String>,
    pub policy: Policy,
}

impl AppStateInner {
    pub fn is_admin(&self, presented: Option<&str>) -> bool {
        match (&self.admin_token, presented) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}
