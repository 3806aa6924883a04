//! Search handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, PostResponse, SearchAllResponse, SearchScopeQuery};
use crate::web::error::ApiError;
use crate::web::extract::Paging;
use crate::web::handlers::AppState;

/// GET /api/search/post/:query - Search post titles.
///
/// `?board_name=` restricts the search to one board (404 if it is missing).
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
    Query(scope): Query<SearchScopeQuery>,
    Paging(pagination): Paging,
) -> Result<Json<ApiResponse<Vec<PostResponse>>>, ApiError> {
    let posts = state
        .board_service()
        .search_posts(&query, scope.board_name.as_deref(), pagination)
        .await?;
    let files = state.attachments_for(&posts).await?;

    Ok(Json(ApiResponse::new(PostResponse::with_files(posts, files))))
}

/// GET /api/search/any/:query - Search post titles and board names.
pub async fn search_any(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
    Paging(pagination): Paging,
) -> Result<Json<ApiResponse<SearchAllResponse>>, ApiError> {
    let results = state.board_service().search_all(&query, pagination).await?;
    let files = state.attachments_for(&results.posts).await?;

    Ok(Json(ApiResponse::new(SearchAllResponse::with_files(
        results, files,
    ))))
}
