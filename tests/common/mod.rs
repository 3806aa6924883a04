//! Test helpers for Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use twok::config::BoardSettings;
use twok::file::FileStorage;
use twok::web::handlers::AppState;
use twok::web::router::create_router;
use twok::Database;

/// Options for building a test server.
pub struct TestOptions {
    pub items_per_page: u32,
    pub post_time_limit: Duration,
    pub storage: Option<TempDir>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            items_per_page: 5,
            post_time_limit: Duration::ZERO,
            storage: None,
        }
    }
}

/// A running test server with its database.
///
/// Holds the storage directory so it outlives the server.
pub struct TestContext {
    pub server: TestServer,
    pub db: Arc<Database>,
    _storage: Option<TempDir>,
}

/// Create a test server with an in-memory database and no post interval.
pub async fn create_test_server() -> TestContext {
    create_test_server_with(TestOptions::default()).await
}

/// Create a test server with custom options.
pub async fn create_test_server_with(options: TestOptions) -> TestContext {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let shared_db = Arc::new(db);

    let settings = BoardSettings {
        items_per_page: options.items_per_page,
        post_time_limit: options.post_time_limit,
    };
    let mut app_state = AppState::new(shared_db.clone(), settings);
    if let Some(dir) = &options.storage {
        let storage = FileStorage::new(dir.path()).expect("Failed to create file storage");
        app_state = app_state.with_file_storage(storage, 1);
    }

    let router = create_router(Arc::new(app_state), &[], None);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        db: shared_db,
        _storage: options.storage,
    }
}

/// Create a board through the API and return its JSON.
pub async fn create_board(server: &TestServer, name: &str) -> Value {
    let response = server
        .post("/api/board")
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Create a post through the API and return its JSON.
pub async fn create_post(
    server: &TestServer,
    board_name: &str,
    title: &str,
    parent_id: Option<i64>,
) -> Value {
    let response = server
        .post("/api/post")
        .json(&json!({
            "board_name": board_name,
            "title": title,
            "message": format!("{} body", title),
            "parent_id": parent_id,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}
