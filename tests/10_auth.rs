mod common;

use anyhow::Result;
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde_json::{json, Value};

use common::{bearer, expired_token_for, foreign_token_for, spawn_server, token_for};

fn protected_routes() -> Vec<(Method, &'static str, Option<Value>)> {
    vec![
        (Method::GET, "/todos", None),
        (Method::POST, "/todos", Some(json!({ "title": "a", "content": "b" }))),
        (
            Method::PUT,
            "/todos",
            Some(json!({ "id": 1, "title": "a", "content": "b", "done": true })),
        ),
        (Method::DELETE, "/todos/1", None),
    ]
}

async fn assert_unauthorized(res: reqwest::Response, message: &str) -> Result<()> {
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": message, "code": "unauthorized" }));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_rejected_on_every_route() -> Result<()> {
    let server = spawn_server().await?;

    for (method, path, body) in protected_routes() {
        let mut req = server.client.request(method, server.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        assert_unauthorized(req.send().await?, "please provide a token").await?;
    }

    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_bearer_counts_as_missing_token() -> Result<()> {
    let server = spawn_server().await?;

    let res = server
        .client
        .get(server.url("/todos"))
        .header("Authorization", "Bearer ")
        .send()
        .await?;

    assert_unauthorized(res, "please provide a token").await
}

#[tokio::test]
async fn invalid_tokens_are_rejected_on_every_route() -> Result<()> {
    let server = spawn_server().await?;

    for token in [expired_token_for(1), foreign_token_for(1), "garbage".to_string()] {
        for (method, path, body) in protected_routes() {
            let mut req = server
                .client
                .request(method, server.url(path))
                .header("Authorization", bearer(&token));
            if let Some(body) = body {
                req = req.json(&body);
            }
            assert_unauthorized(req.send().await?, "unauthorized").await?;
        }
    }

    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn unstorable_user_id_is_rejected_on_every_route() -> Result<()> {
    let server = spawn_server().await?;
    let token = token_for(i64::MAX as u64 + 1);

    for (method, path, body) in protected_routes() {
        let mut req = server
            .client
            .request(method, server.url(path))
            .header("Authorization", bearer(&token));
        if let Some(body) = body {
            req = req.json(&body);
        }
        assert_unauthorized(req.send().await?, "unauthorized").await?;
    }

    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn authentication_runs_before_body_validation() -> Result<()> {
    let server = spawn_server().await?;

    let res = server
        .client
        .post(server.url("/todos"))
        .body("{ not json")
        .send()
        .await?;

    assert_unauthorized(res, "please provide a token").await
}

#[tokio::test]
async fn raw_token_without_bearer_prefix_is_accepted() -> Result<()> {
    let server = spawn_server().await?;

    let res = server
        .client
        .get(server.url("/todos"))
        .header("Authorization", token_for(1))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn health_endpoint_is_public() -> Result<()> {
    let server = spawn_server().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");

    server.store.set_unavailable(true);
    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
