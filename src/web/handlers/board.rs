//! Board handlers for Web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, BoardResponse, CreateBoardRequest, PostResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::extract::Paging;
use crate::web::handlers::AppState;

/// GET /api/board - List boards.
pub async fn list_boards(
    State(state): State<Arc<AppState>>,
    Paging(pagination): Paging,
) -> Result<Json<ApiResponse<Vec<BoardResponse>>>, ApiError> {
    let boards = state.board_service().list_boards(pagination).await?;

    Ok(Json(ApiResponse::new(
        boards.into_iter().map(BoardResponse::from).collect(),
    )))
}

/// POST /api/board - Create a board.
pub async fn create_board(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateBoardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BoardResponse>>), ApiError> {
    let board = state.board_service().create_board(&req.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(BoardResponse::from(board))),
    ))
}

/// GET /api/board/:board_name - Get a board.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
    Path(board_name): Path<String>,
) -> Result<Json<ApiResponse<BoardResponse>>, ApiError> {
    let board = state.board_service().get_board(&board_name).await?;

    Ok(Json(ApiResponse::new(BoardResponse::from(board))))
}

/// GET /api/board/:board_name/posts - List a board's threads by latest activity.
pub async fn list_board_posts(
    State(state): State<Arc<AppState>>,
    Path(board_name): Path<String>,
    Paging(pagination): Paging,
) -> Result<Json<ApiResponse<Vec<PostResponse>>>, ApiError> {
    let posts = state
        .board_service()
        .list_board_posts(&board_name, pagination)
        .await?;
    let files = state.attachments_for(&posts).await?;

    Ok(Json(ApiResponse::new(PostResponse::with_files(posts, files))))
}

/// GET /api/board/:board_name/posts/pagecount - Number of thread pages.
pub async fn board_page_count(
    State(state): State<Arc<AppState>>,
    Path(board_name): Path<String>,
) -> Result<Json<ApiResponse<i64>>, ApiError> {
    let pages = state.board_service().page_count(&board_name).await?;

    Ok(Json(ApiResponse::new(pages)))
}
