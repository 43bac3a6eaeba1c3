#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use todo_api_rust::{
    app, auth::JwtVerifier, database::InMemoryTodoStore, services::TodoService, AppState,
};

pub const SECRET: &[u8] = b"integration-test-secret";

/// A server bound to a free local port, backed by an in-memory store that the
/// test can inspect or switch off.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<InMemoryTodoStore>,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryTodoStore::new());
    let state = AppState::new(
        TodoService::new(store.clone()),
        Arc::new(JwtVerifier::from_secret(SECRET)),
    );

    // Bound before spawning, so the server accepts connections immediately
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(TestServer {
        base_url,
        store,
        client: reqwest::Client::new(),
        handle,
    })
}

pub fn token_for(user_id: u64) -> String {
    sign(user_id, (Utc::now() + Duration::hours(1)).timestamp(), SECRET)
}

pub fn expired_token_for(user_id: u64) -> String {
    sign(user_id, (Utc::now() - Duration::hours(1)).timestamp(), SECRET)
}

pub fn foreign_token_for(user_id: u64) -> String {
    sign(user_id, (Utc::now() + Duration::hours(1)).timestamp(), b"another-issuer")
}

fn sign(user_id: u64, exp: i64, secret: &[u8]) -> String {
    encode(
        &Header::default(),
        &json!({ "user_id": user_id, "exp": exp }),
        &EncodingKey::from_secret(secret),
    )
    .expect("failed to sign test token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
