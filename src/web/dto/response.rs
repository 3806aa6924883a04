//! Response DTOs for Web API.

use std::collections::HashMap;

use serde::Serialize;

use crate::board::{Board, Post, PostDetail, SearchResults};
use crate::datetime::to_rfc3339;
use crate::file::Attachment;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Board / Post
// ============================================================================

/// Board in responses.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// Board ID.
    pub board_id: i64,
    /// Board name.
    pub name: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        Self {
            board_id: board.board_id,
            name: board.name,
            created_at: to_rfc3339(&board.created_at),
        }
    }
}

/// Post in responses.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub post_id: i64,
    /// Owning board ID.
    pub board_id: i64,
    /// Parent post ID (null for thread roots).
    pub parent_id: Option<i64>,
    /// Title.
    pub title: String,
    /// Body.
    pub message: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub date: String,
    /// Latest activity in the thread (RFC 3339, roots only).
    pub latest_reply_date: Option<String>,
    /// Files attached to the post.
    pub files: Vec<FileResponse>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.post_id,
            board_id: post.board_id,
            parent_id: post.parent_id,
            title: post.title,
            message: post.message,
            date: to_rfc3339(&post.date),
            latest_reply_date: post.latest_reply_date.as_ref().map(to_rfc3339),
            files: Vec::new(),
        }
    }
}

impl PostResponse {
    /// Build responses for `posts`, each carrying its files from `attachments`.
    ///
    /// Attachments keep their order; ones not linked to any of `posts` are ignored.
    pub fn with_files(posts: Vec<Post>, attachments: Vec<Attachment>) -> Vec<Self> {
        let mut by_post: HashMap<i64, Vec<FileResponse>> = HashMap::new();
        for attachment in attachments {
            if let Some(post_id) = attachment.post_id {
                by_post
                    .entry(post_id)
                    .or_default()
                    .push(FileResponse::from(attachment));
            }
        }

        posts
            .into_iter()
            .map(|post| {
                let files = by_post.remove(&post.post_id).unwrap_or_default();
                Self {
                    files,
                    ..Self::from(post)
                }
            })
            .collect()
    }
}

/// Post with its direct replies.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    /// The post.
    #[serde(flatten)]
    pub post: PostResponse,
    /// Direct replies, oldest first.
    pub replies: Vec<PostResponse>,
}

impl PostDetailResponse {
    /// Build the response for `detail`, distributing `attachments` over the
    /// post and its replies.
    pub fn with_files(detail: PostDetail, attachments: Vec<Attachment>) -> Self {
        let post_id = detail.post.post_id;
        let (own, rest): (Vec<_>, Vec<_>) = attachments
            .into_iter()
            .partition(|a| a.post_id == Some(post_id));

        Self {
            post: PostResponse {
                files: own.into_iter().map(FileResponse::from).collect(),
                ..PostResponse::from(detail.post)
            },
            replies: PostResponse::with_files(detail.replies, rest),
        }
    }
}

/// Result of `/api/search/any`.
#[derive(Debug, Serialize)]
pub struct SearchAllResponse {
    pub posts: Vec<PostResponse>,
    pub boards: Vec<BoardResponse>,
}

impl SearchAllResponse {
    /// Build the response, attaching `attachments` to the matching posts.
    pub fn with_files(results: SearchResults, attachments: Vec<Attachment>) -> Self {
        Self {
            posts: PostResponse::with_files(results.posts, attachments),
            boards: results.boards.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Attachment metadata in responses.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub file_id: i64,
    /// Original file name.
    pub file_name: String,
    /// SHA-256 hex digest of the content.
    pub file_hash: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Linked post, if any.
    pub post_id: Option<i64>,
    /// Upload timestamp (RFC 3339).
    pub created_at: String,
}

impl From<Attachment> for FileResponse {
    fn from(file: Attachment) -> Self {
        Self {
            file_id: file.file_id,
            file_name: file.file_name,
            file_hash: file.file_hash,
            content_type: file.content_type,
            size: file.size,
            post_id: file.post_id,
            created_at: to_rfc3339(&file.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime;

    fn post(post_id: i64, parent_id: Option<i64>) -> Post {
        Post {
            post_id,
            board_id: 1,
            parent_id,
            title: format!("post {post_id}"),
            message: None,
            date: datetime::now(),
            latest_reply_date: None,
        }
    }

    fn attachment(file_id: i64, post_id: Option<i64>) -> Attachment {
        Attachment {
            file_id,
            file_name: format!("{file_id}.txt"),
            stored_name: format!("{file_id}-stored.txt"),
            file_hash: "00".to_string(),
            content_type: "text/plain".to_string(),
            size: 1,
            post_id,
            created_at: datetime::now(),
        }
    }

    fn file_ids(response: &PostResponse) -> Vec<i64> {
        response.files.iter().map(|f| f.file_id).collect()
    }

    #[test]
    fn test_post_responses_group_files_by_post() {
        let responses = PostResponse::with_files(
            vec![post(1, None), post(2, None), post(3, None)],
            vec![
                attachment(10, Some(2)),
                attachment(11, Some(1)),
                attachment(12, Some(2)),
                attachment(13, Some(99)),
                attachment(14, None),
            ],
        );

        assert_eq!(file_ids(&responses[0]), vec![11]);
        assert_eq!(file_ids(&responses[1]), vec![10, 12]);
        assert!(responses[2].files.is_empty());
    }

    #[test]
    fn test_post_detail_splits_files_between_post_and_replies() {
        let detail = PostDetail {
            post: post(1, None),
            replies: vec![post(2, Some(1))],
        };

        let response =
            PostDetailResponse::with_files(detail, vec![attachment(5, Some(2)), attachment(6, Some(1))]);

        assert_eq!(file_ids(&response.post), vec![6]);
        assert_eq!(file_ids(&response.replies[0]), vec![5]);
    }
}
