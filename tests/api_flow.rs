use anyhow::Result;
use argon2::Params;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use forum::{
    api::app,
    auth::{CredentialCodec, TokenCodec},
    forum::Forum,
    store::MemoryStore,
};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

fn test_app() -> Result<Router> {
    let params = Params::new(64, 1, 1, None).map_err(anyhow::Error::msg)?;
    let forum = Forum::new(
        Arc::new(MemoryStore::new()),
        TokenCodec::new(b"integration-secret", Duration::from_secs(600)),
        CredentialCodec::new("integration-pepper").with_params(params),
    );
    app(Arc::new(forum), Some("https://forum.dev"))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, token);
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

async fn join(app: &Router, username: &str, nickname: &str) -> Result<(String, i64)> {
    let (status, body) = call(
        app,
        "POST",
        "/api/v1/register",
        None,
        Some(json!({
            "username": username,
            "password": "Pass1234*",
            "nickname": nickname,
            "mobile": "+34.612345678901",
            "url": "https://forum.dev",
            "magic_number": 7
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "ok" }));

    let (status, body) = call(
        app,
        "PATCH",
        "/api/v1/login",
        None,
        Some(json!({ "username": username, "password": "Pass1234*" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username);
    assert_eq!(body["nickname"], nickname);
    let jwt = body["jwt"].as_str().unwrap_or_default().to_string();
    let user_id = body["userId"].as_i64().unwrap_or_default();
    assert!(!jwt.is_empty());
    Ok((jwt, user_id))
}

async fn new_post(app: &Router, token: &str, title: &str) -> Result<i64> {
    let (status, body) = call(
        app,
        "POST",
        "/api/v1/post",
        Some(token),
        Some(json!({ "title": title, "content": format!("about {title}") })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["postId"].as_i64().unwrap_or_default())
}

#[tokio::test]
async fn posts_paginate_newest_first() -> Result<()> {
    let app = test_app()?;
    let (alice, alice_id) = join(&app, "alice01", "Alice").await?;

    for n in 0..12 {
        new_post(&app, &alice, &format!("post {n}")).await?;
    }

    let (status, first) = call(&app, "GET", "/api/v1/post?size=10", Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total"], 12);
    assert_eq!(first["page"], 1);
    assert_eq!(first["posts"].as_array().map(Vec::len), Some(10));
    assert_eq!(first["posts"][0]["title"], "post 11");
    assert_eq!(first["posts"][0]["nickname"], "Alice");
    assert_eq!(first["posts"][0]["userId"], alice_id);

    let (_, second) = call(&app, "GET", "/api/v1/post?page=2&size=10", Some(&alice), None).await?;
    assert_eq!(second["posts"].as_array().map(Vec::len), Some(2));
    assert_eq!(second["posts"][1]["title"], "post 0");

    let (_, beyond) = call(&app, "GET", "/api/v1/post?page=5", Some(&alice), None).await?;
    assert_eq!(beyond["posts"], json!([]));
    assert_eq!(beyond["total"], 12);
    Ok(())
}

#[tokio::test]
async fn replies_bump_threads_and_nest() -> Result<()> {
    let app = test_app()?;
    let (alice, alice_id) = join(&app, "alice01", "Alice").await?;
    let (bob, bob_id) = join(&app, "bob_0001", "Bob").await?;

    let quiet = new_post(&app, &alice, "quiet").await?;
    new_post(&app, &alice, "newer").await?;

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/v1/post/{quiet}/reply"),
        Some(&bob),
        Some(json!({ "content": "first!" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, by_reply) = call(
        &app,
        "GET",
        "/api/v1/post?orderByReply=true",
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(by_reply["posts"][0]["id"], quiet);
    assert_eq!(by_reply["posts"][0]["lastRepliedUserId"], bob_id);
    assert_eq!(by_reply["posts"][0]["lastRepliedNickname"], "Bob");

    let (_, detail) = call(&app, "GET", &format!("/api/v1/post/{quiet}"), Some(&alice), None).await?;
    let root_reply = detail["reply"][0]["id"].as_i64().unwrap_or_default();
    assert_eq!(detail["reply"][0]["nickname"], "Bob");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/v1/post/{quiet}/reply"),
        Some(&alice),
        Some(json!({ "content": "welcome", "replyId": root_reply })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = call(&app, "GET", &format!("/api/v1/post/{quiet}"), Some(&bob), None).await?;
    let replies = detail["reply"].as_array().cloned().unwrap_or_default();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["replyId"], 0);
    assert_eq!(replies[1]["replyId"], root_reply);
    assert_eq!(replies[1]["userId"], alice_id);
    assert_eq!(detail["lastRepliedUserId"], alice_id);

    let (_, mine) = call(
        &app,
        "GET",
        &format!("/api/v1/post?userId={bob_id}"),
        Some(&bob),
        None,
    )
    .await?;
    assert_eq!(mine["total"], 0);
    Ok(())
}

#[tokio::test]
async fn only_owners_edit() -> Result<()> {
    let app = test_app()?;
    let (alice, _) = join(&app, "alice01", "Alice").await?;
    let (bob, _) = join(&app, "bob_0001", "Bob").await?;

    let post = new_post(&app, &alice, "mine").await?;
    let other = new_post(&app, &alice, "also mine").await?;
    let post_uri = format!("/api/v1/post/{post}");
    let edit = json!({ "title": "edited", "content": "edited body" });

    let (status, _) = call(&app, "PUT", &post_uri, Some(&bob), Some(edit.clone())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "PUT", &post_uri, Some(&alice), Some(edit)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "ok" }));

    let (_, detail) = call(&app, "GET", &post_uri, Some(&bob), None).await?;
    assert_eq!(detail["title"], "edited");

    call(
        &app,
        "POST",
        &format!("{post_uri}/reply"),
        Some(&bob),
        Some(json!({ "content": "nice" })),
    )
    .await?;
    let (_, detail) = call(&app, "GET", &post_uri, Some(&bob), None).await?;
    let reply = detail["reply"][0]["id"].as_i64().unwrap_or_default();
    let reply_edit = json!({ "content": "nicer" });

    let (status, _) = call(
        &app,
        "PUT",
        &format!("{post_uri}/reply/{reply}"),
        Some(&alice),
        Some(reply_edit.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/v1/post/{other}/reply/{reply}"),
        Some(&bob),
        Some(reply_edit.clone()),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("{post_uri}/reply/{reply}"),
        Some(&bob),
        Some(reply_edit),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = call(&app, "GET", &post_uri, Some(&alice), None).await?;
    assert_eq!(detail["reply"][0]["content"], "nicer");
    Ok(())
}

#[tokio::test]
async fn validation_runs_after_authentication() -> Result<()> {
    let app = test_app()?;

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/post",
        None,
        Some(json!({ "content": "no title" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "User must be authorized." }));

    let (alice, _) = join(&app, "alice01", "Alice").await?;
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/post",
        Some(&alice),
        Some(json!({ "content": "no title" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Invalid arguments: title" }));
    Ok(())
}

#[tokio::test]
async fn current_user_reflects_registration() -> Result<()> {
    let app = test_app()?;
    let (alice, alice_id) = join(&app, "alice01", "Alice").await?;

    let (status, me) = call(&app, "GET", "/api/v1/user", Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], alice_id);
    assert_eq!(me["magicNumber"], 7);
    assert_eq!(me["mobile"], "+34.612345678901");
    Ok(())
}
