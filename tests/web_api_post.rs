//! Web API Post Tests
//!
//! Integration tests for post creation, replies and the posting interval.

mod common;

use std::time::Duration;

use axum::http::{header::RETRY_AFTER, StatusCode};
use serde_json::{json, Value};

use common::{create_board, create_post, create_test_server, create_test_server_with, TestOptions};

// ============================================================================
// Create Post Tests
// ============================================================================

#[tokio::test]
async fn test_create_root_post() {
    let ctx = create_test_server().await;
    let board = create_board(&ctx.server, "general").await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({
            "board_name": "general",
            "title": "Hello",
            "message": "First post"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let post: Value = response.json::<Value>()["data"].clone();
    assert_eq!(post["board_id"], board["board_id"]);
    assert!(post["parent_id"].is_null());
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["message"], "First post");
    // A new thread's latest activity is its own creation.
    assert_eq!(post["latest_reply_date"], post["date"]);
}

#[tokio::test]
async fn test_create_post_without_message() {
    let ctx = create_test_server().await;
    create_board(&ctx.server, "general").await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "general", "title": "Title only" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert!(response.json::<Value>()["data"]["message"].is_null());
}

#[tokio::test]
async fn test_reply_bumps_thread_root() {
    let ctx = create_test_server().await;
    create_board(&ctx.server, "general").await;

    let root = create_post(&ctx.server, "general", "root", None).await;
    let root_id = root["post_id"].as_i64().unwrap();
    let reply = create_post(&ctx.server, "general", "reply", Some(root_id)).await;
    let nested = create_post(
        &ctx.server,
        "general",
        "nested",
        reply["post_id"].as_i64(),
    )
    .await;

    assert_eq!(reply["parent_id"], root_id);
    assert!(reply["latest_reply_date"].is_null());

    let body: Value = ctx.server.get(&format!("/api/post/{}", root_id)).await.json();
    let detail = &body["data"];
    assert_eq!(detail["latest_reply_date"], nested["date"]);

    // Only direct replies are listed.
    let replies = detail["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["post_id"], reply["post_id"]);
}

#[tokio::test]
async fn test_reply_to_missing_parent() {
    let ctx = create_test_server().await;
    create_board(&ctx.server, "general").await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({
            "board_name": "general",
            "title": "orphan",
            "parent_id": 9999
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);

    let list: Value = ctx.server.get("/api/post").await.json();
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reply_across_boards_rejected() {
    let ctx = create_test_server().await;
    create_board(&ctx.server, "one").await;
    create_board(&ctx.server, "two").await;
    let root = create_post(&ctx.server, "one", "root", None).await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({
            "board_name": "two",
            "title": "wrong board",
            "parent_id": root["post_id"]
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_post_board_not_found() {
    let ctx = create_test_server().await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "missing", "title": "Hello" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_post_validation() {
    let ctx = create_test_server().await;
    create_board(&ctx.server, "general").await;

    let blank_title = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "general", "title": "   " }))
        .await;
    blank_title.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(blank_title.json::<Value>()["error"]["details"]["title"].is_array());

    let long_message = ctx
        .server
        .post("/api/post")
        .json(&json!({
            "board_name": "general",
            "title": "Hello",
            "message": "m".repeat(513)
        }))
        .await;
    long_message.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let missing_title = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "general" }))
        .await;
    missing_title.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Posting Interval Tests
// ============================================================================

#[tokio::test]
async fn test_post_interval_enforced() {
    let ctx = create_test_server_with(TestOptions {
        post_time_limit: Duration::from_secs(60),
        ..Default::default()
    })
    .await;
    create_board(&ctx.server, "general").await;
    create_post(&ctx.server, "general", "first", None).await;

    let response = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "general", "title": "second" }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .header(RETRY_AFTER)
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    // The rejected attempt is not stored.
    let list: Value = ctx.server.get("/api/post").await.json();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_body_does_not_consume_interval() {
    let ctx = create_test_server_with(TestOptions {
        post_time_limit: Duration::from_secs(60),
        ..Default::default()
    })
    .await;
    create_board(&ctx.server, "general").await;

    let invalid = ctx
        .server
        .post("/api/post")
        .json(&json!({ "board_name": "general", "title": "" }))
        .await;
    invalid.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    create_post(&ctx.server, "general", "valid", None).await;
}

// ============================================================================
// Get / List Post Tests
// ============================================================================

#[tokio::test]
async fn test_get_post_not_found() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/api/post/42").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_post_invalid_id() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/api/post/abc").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_posts_includes_replies() {
    let ctx = create_test_server_with(TestOptions {
        items_per_page: 2,
        ..Default::default()
    })
    .await;
    create_board(&ctx.server, "general").await;
    let root = create_post(&ctx.server, "general", "root", None).await;
    create_post(&ctx.server, "general", "reply", root["post_id"].as_i64()).await;
    create_post(&ctx.server, "general", "another", None).await;

    let first: Value = ctx.server.get("/api/post").await.json();
    assert_eq!(first["data"].as_array().unwrap().len(), 2);

    let second: Value = ctx.server.get("/api/post").add_query_param("page", 2).await.json();
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
}
