//! End-to-end tests over the router, no network involved.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use corkboard_api::authz::Policy;
use corkboard_api::lifecycle::LifecycleManager;
use corkboard_api::routes::router;
use corkboard_api::{AppState, AppStateInner};
use corkboard_store::FsSnapshotStore;
use corkboard_types::api::Claims;

const JWT_SECRET: &str = "test-secret";
const ADMIN_TOKEN: &str = "admin-secret";

async fn test_app(dir: &tempfile::TempDir) -> Router {
    let store = Arc::new(
        FsSnapshotStore::new(dir.path().join("snapshots"))
            .await
            .unwrap(),
    );
    let (lifecycle, _) = LifecycleManager::initialize(store, "test-group".into())
        .await
        .unwrap();

    let state: AppState = Arc::new(AppStateInner {
        lifecycle,
        jwt_secret: JWT_SECRET.into(),
        admin_token: Some(ADMIN_TOKEN.into()),
        policy: Policy::default(),
    });
    router(state)
}

fn token_for(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        username: format!("{user_id}-name"),
        exp: (chrono::Utc::now() + chrono::Duration::days(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

struct TestRequest<'a> {
    method: &'a str,
    uri: &'a str,
    bearer: Option<&'a str>,
    admin: bool,
    body: Option<Value>,
}

impl<'a> TestRequest<'a> {
    fn new(method: &'a str, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            bearer: None,
            admin: false,
            body: None,
        }
    }

    fn bearer(mut self, user_id: &'a str) -> Self {
        self.bearer = Some(user_id);
        self
    }

    fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    async fn send(self, app: &Router) -> Response<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(user_id) = self.bearer {
            builder = builder.header("authorization", format!("Bearer {}", token_for(user_id)));
        }
        if self.admin {
            builder = builder.header("x-admin-token", ADMIN_TOKEN);
        }
        let body = match self.body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_note(app: &Router, user_id: &str, note: &str) -> Response<Body> {
    TestRequest::new("POST", "/messages")
        .bearer(user_id)
        .body(json!({ "note": note, "author": "a" }))
        .send(app)
        .await
}

#[tokio::test]
async fn create_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let response = post_note(&app, "u1", "hi").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["user_id"], "u1");

    let response = TestRequest::new("GET", "/messages").send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["note"], "hi");
    assert_eq!(listed[0]["user_id"], "u1");
    assert_eq!(listed[0]["id"], 1);
}

#[tokio::test]
async fn list_is_public_and_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "first").await;
    post_note(&app, "u1", "second").await;

    let response = TestRequest::new("GET", "/messages?limit=1").send(&app).await;
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["note"], "second");
}

#[tokio::test]
async fn anonymous_create_is_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let response = TestRequest::new("POST", "/messages")
        .body(json!({ "note": "hi", "author": "a" }))
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let request = Request::builder()
        .method("GET")
        .uri("/messages")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_note_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let response = TestRequest::new("POST", "/messages")
        .bearer("u1")
        .body(json!({ "note": "x".repeat(1001), "author": "a" }))
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_by_any_identity_and_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "v1").await;

    // Base policy: any identity may update
    let response = TestRequest::new("PUT", "/messages/1")
        .bearer("u2")
        .body(json!({ "note": "v2" }))
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["note"], "v2");
    // Ownership never moves
    assert_eq!(updated["user_id"], "u1");

    let response = TestRequest::new("PUT", "/messages/99")
        .bearer("u1")
        .body(json!({ "note": "x" }))
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_by_non_owner_is_forbidden_and_row_remains() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "keep me").await;

    let response = TestRequest::new("DELETE", "/messages/1")
        .bearer("u2")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let listed = json_body(TestRequest::new("GET", "/messages").send(&app).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_by_owner_then_again_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "bye").await;

    let response = TestRequest::new("DELETE", "/messages/1")
        .bearer("u1")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = TestRequest::new("DELETE", "/messages/1")
        .bearer("u1")
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_by_admin_credential() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "admin removes this").await;

    let response = TestRequest::new("DELETE", "/messages/1")
        .admin()
        .send(&app)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn anonymous_delete_is_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "hi").await;

    let response = TestRequest::new("DELETE", "/messages/1").send(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_missing_and_wrong_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let response = TestRequest::new("POST", "/backup").send(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/restore")
        .header("x-admin-token", "wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An identity token is not an admin credential
    let response = TestRequest::new("POST", "/backup").bearer("u1").send(&app).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn backup_then_restore_round_trip_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    post_note(&app, "u1", "durable").await;

    let response = TestRequest::new("POST", "/backup").admin().send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let backup = json_body(response).await;
    assert_eq!(backup["cid"].as_str().unwrap().len(), 64);

    // Mutate past the snapshot, then roll back
    post_note(&app, "u1", "ephemeral").await;

    let response = TestRequest::new("POST", "/restore").admin().send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    let restore = json_body(response).await;
    assert_ne!(restore["status"], "fresh");

    let listed = json_body(TestRequest::new("GET", "/messages").send(&app).await).await;
    let notes: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["note"].as_str().unwrap())
        .collect();
    assert_eq!(notes, vec!["durable"]);
}

#[tokio::test]
async fn welcome_banner() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(&dir).await;

    let response = TestRequest::new("GET", "/").send(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
}
