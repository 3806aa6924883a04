//! Post model for twok.
//!
//! Posts form a tree through `parent_id`. A post without a parent is a thread
//! root; only roots carry a meaningful `latest_reply_date`.

use chrono::{DateTime, Utc};

/// Post entity representing a thread root or a reply.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
    /// Unique post ID.
    pub post_id: i64,
    /// ID of the board this post belongs to.
    pub board_id: i64,
    /// ID of the post this one replies to (None for thread roots).
    pub parent_id: Option<i64>,
    /// Post title.
    pub title: String,
    /// Post body.
    pub message: Option<String>,
    /// Creation timestamp.
    pub date: DateTime<Utc>,
    /// Most recent creation timestamp in this thread (roots only).
    pub latest_reply_date: Option<DateTime<Utc>>,
}

impl Post {
    /// Check if this post starts a thread.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// ID of the board.
    pub board_id: i64,
    /// ID of the parent post, if this is a reply.
    pub parent_id: Option<i64>,
    /// Post title.
    pub title: String,
    /// Post body.
    pub message: Option<String>,
    /// Attachment to link to the new post.
    pub file_id: Option<i64>,
}

impl NewPost {
    /// Create a new thread root with required fields.
    pub fn new(board_id: i64, title: impl Into<String>) -> Self {
        Self {
            board_id,
            parent_id: None,
            title: title.into(),
            message: None,
            file_id: None,
        }
    }

    /// Make this post a reply to `parent_id`.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the post body.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Link an uploaded attachment.
    pub fn with_file(mut self, file_id: i64) -> Self {
        self.file_id = Some(file_id);
        self
    }
}
