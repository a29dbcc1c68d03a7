//! Shared fixtures for esl-server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use esl_common::config::RecommendationConfig;
use esl_common::db::{init_database, Difficulty};
use esl_server::db::{categories, sentences};
use esl_server::{build_router, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

/// Temporary database plus router; the directory lives as long as this does
pub struct TestApp {
    _dir: TempDir,
    pub pool: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Should create temp dir");
        let pool = init_database(&dir.path().join("esl.db"))
            .await
            .expect("Should initialize database");
        Self { _dir: dir, pool }
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(self.pool.clone(), RecommendationConfig::default()))
    }

    pub async fn category(&self, owner: &str, name: &str) -> Uuid {
        categories::insert_category(&self.pool, owner, name, "#22c55e")
            .await
            .expect("Should insert category")
            .id
    }

    pub async fn sentence(
        &self,
        owner: &str,
        category_id: Uuid,
        english: &str,
        shared: bool,
        audio: bool,
    ) -> Uuid {
        let new = sentences::NewSentence {
            english_text: english.to_string(),
            chinese_text: "例句".to_string(),
            difficulty: Difficulty::Easy,
            audio_url: audio.then(|| format!("https://cdn.example.com/{}.mp3", Uuid::new_v4())),
            is_shared: shared,
            category_id,
        };
        sentences::insert_sentence(&self.pool, owner, &new)
            .await
            .expect("Should insert sentence")
    }

    /// Send a request as `user` (no identity when `None`)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send_to(self.router(), method, uri, user, body).await
    }

    /// Send a raw, possibly malformed, JSON body as `user`
    pub async fn send_raw(&self, method: &str, uri: &str, user: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-Id", user)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        into_status_and_json(self.router().oneshot(request).await.unwrap()).await
    }

    pub async fn get(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(user), None).await
    }
}

/// Send a request through an arbitrary router
pub async fn send_to(
    router: Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    into_status_and_json(router.oneshot(request).await.unwrap()).await
}

async fn into_status_and_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

/// Extract a JSON body; empty bodies become `Value::Null`
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
