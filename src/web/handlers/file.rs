//! File attachment handlers for Web API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::board::PostRepository;
use crate::file::{hash_content, resolve_content_type, AttachmentRepository, NewAttachment};
use crate::web::dto::{ApiResponse, FileResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Build a Content-Disposition header value that cannot inject headers.
///
/// Control characters are dropped; quotes, backslashes and non-ASCII
/// characters are replaced with `_`.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!("attachment; filename=\"{}\"", sanitized)
}

/// Map a multipart read failure, keeping the body limit distinct.
fn multipart_error(err: MultipartError, message: &str) -> ApiError {
    tracing::warn!("Failed to read multipart body: {}", err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("File too large")
    } else {
        ApiError::bad_request(message)
    }
}

/// POST /api/file - Upload an attachment.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "post_id" field linking the upload to an existing post.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let storage = state
        .file_storage
        .as_ref()
        .ok_or_else(|| ApiError::internal("File storage not configured"))?;

    let mut filename: Option<String> = None;
    let mut declared_type: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut post_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart data"))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                declared_type = field.content_type().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error(e, "Failed to read file"))?
                        .to_vec(),
                );
            }
            "post_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid post_id"))?;
                let text = text.trim();
                if !text.is_empty() {
                    post_id = Some(
                        text.parse()
                            .map_err(|_| ApiError::bad_request("post_id must be an integer"))?,
                    );
                }
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let filename = filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "upload.bin".to_string());

    if content.len() as u64 > state.max_upload_size {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return Err(ApiError::payload_too_large(format!(
            "File too large (max {}MB)",
            max_mb
        )));
    }

    if let Some(post_id) = post_id {
        PostRepository::new(state.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| ApiError::not_found("post not found"))?;
    }

    let stored_name = storage.save(&content, &filename)?;

    let new_attachment = NewAttachment {
        file_hash: hash_content(&content),
        content_type: resolve_content_type(declared_type.as_deref(), &filename),
        size: content.len() as i64,
        stored_name: stored_name.clone(),
        file_name: filename,
    };

    let repo = AttachmentRepository::new(state.db.pool());
    let mut attachment = match repo.create(&new_attachment).await {
        Ok(attachment) => attachment,
        Err(e) => {
            if let Err(cleanup) = storage.delete(&stored_name) {
                tracing::warn!("Failed to remove orphaned upload {}: {}", stored_name, cleanup);
            }
            return Err(e.into());
        }
    };

    if let Some(post_id) = post_id {
        repo.attach_to_post(attachment.file_id, post_id).await?;
        attachment.post_id = Some(post_id);
    }

    tracing::info!(
        file_id = attachment.file_id,
        size = attachment.size,
        hash = %attachment.file_hash,
        "file uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(attachment))),
    ))
}

/// GET /api/file/:file_id - Get attachment metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let attachment = AttachmentRepository::new(state.db.pool())
        .get_by_id(file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("file not found"))?;

    Ok(Json(ApiResponse::new(FileResponse::from(attachment))))
}

/// GET /api/file/:file_id/content - Download attachment content.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let storage = state
        .file_storage
        .as_ref()
        .ok_or_else(|| ApiError::internal("File storage not configured"))?;

    let attachment = AttachmentRepository::new(state.db.pool())
        .get_by_id(file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("file not found"))?;

    let content = storage.load(&attachment.stored_name)?;

    Response::builder()
        .header(header::CONTENT_TYPE, &attachment.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&attachment.file_name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
