//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    board_page_count, create_board, create_post, download_file, get_board, get_file, get_post,
    list_board_posts, list_boards, list_posts, search_any, search_posts, upload_file, AppState,
};
use super::middleware::{api_rate_limit, create_cors_layer, RateLimitState};

/// Room for multipart boundaries and the extra form fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
///
/// `rate_limit` adds the per-IP request limiter in front of every API route.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    rate_limit: Option<Arc<RateLimitState>>,
) -> Router {
    let upload_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let board_routes = Router::new()
        .route("/", get(list_boards).post(create_board))
        .route("/:board_name", get(get_board))
        .route("/:board_name/posts", get(list_board_posts))
        .route("/:board_name/posts/pagecount", get(board_page_count));

    let post_routes = Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:post_id", get(get_post));

    let search_routes = Router::new()
        .route("/post/:query", get(search_posts))
        .route("/any/:query", get(search_any));

    let file_routes = Router::new()
        .route(
            "/",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/:file_id", get(get_file))
        .route("/:file_id/content", get(download_file));

    let mut api_routes = Router::new()
        .nest("/board", board_routes)
        .nest("/post", post_routes)
        .nest("/search", search_routes)
        .nest("/file", file_routes);

    if let Some(rate_limit) = rate_limit {
        api_routes = api_routes.layer(middleware::from_fn(move |req, next| {
            let state = rate_limit.clone();
            api_rate_limit(state, req, next)
        }));
    }

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardSettings;
    use crate::Database;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::new(Arc::new(db), BoardSettings::default());
        create_router(Arc::new(state), &[], None)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = create_health_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_board_list_route() {
        let response = test_router()
            .await
            .oneshot(Request::get("/api/board").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_router()
            .await
            .oneshot(Request::get("/api/nothing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit_layer() {
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::new(Arc::new(db), BoardSettings::default());
        let limiter = Arc::new(RateLimitState::new(1, false));
        let router = create_router(Arc::new(state), &[], Some(limiter));

        let first = router
            .clone()
            .oneshot(Request::get("/api/board").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(Request::get("/api/board").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
