//! Post handlers for Web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::board::PostDraft;
use crate::datetime;
use crate::file::AttachmentRepository;
use crate::web::dto::{
    ApiResponse, CreatePostRequest, FileResponse, PostDetailResponse, PostResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::extract::{ClientIp, Paging};
use crate::web::handlers::AppState;

/// GET /api/post - List all posts.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Paging(pagination): Paging,
) -> Result<Json<ApiResponse<Vec<PostResponse>>>, ApiError> {
    let posts = state.board_service().list_posts(pagination).await?;
    let files = state.attachments_for(&posts).await?;

    Ok(Json(ApiResponse::new(PostResponse::with_files(posts, files))))
}

/// GET /api/post/:post_id - Get a post with its direct replies.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostDetailResponse>>, ApiError> {
    let detail = state.board_service().get_post(post_id).await?;
    let files = state
        .attachments_for(std::iter::once(&detail.post).chain(&detail.replies))
        .await?;

    Ok(Json(ApiResponse::new(PostDetailResponse::with_files(
        detail, files,
    ))))
}

/// POST /api/post - Create a post or reply.
///
/// The requester must pass the admission gate first; a rejected attempt is
/// a 429 with `Retry-After`.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), ApiError> {
    state
        .admission_gate()
        .check(&ip, datetime::now())
        .await?
        .into_result()?;

    let draft = PostDraft {
        board_name: req.board_name,
        parent_id: req.parent_id,
        title: req.title,
        message: req.message,
        file_id: req.file_id,
    };
    let post = state.board_service().create_post(&draft).await?;
    let files = AttachmentRepository::new(state.db.pool())
        .list_by_post(post.post_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PostResponse {
            files: files.into_iter().map(FileResponse::from).collect(),
            ..PostResponse::from(post)
        })),
    ))
}
