//! Attachment metadata and repository for twok.

use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;

use crate::datetime;
use crate::db::{DbBackend, DbConnection, DbPool};
use crate::{Result, TwokError};

const ATTACHMENT_COLUMNS: &str =
    "file_id, file_name, stored_name, file_hash, content_type, size, post_id, created_at";

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Attachment {
    /// Unique file ID.
    pub file_id: i64,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Name under which the content is kept in `FileStorage`.
    pub stored_name: String,
    /// SHA-256 hex digest of the content.
    pub file_hash: String,
    /// MIME type served on download.
    pub content_type: String,
    /// Content size in bytes.
    pub size: i64,
    /// Post this file is attached to.
    pub post_id: Option<i64>,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for recording a new upload.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub file_name: String,
    pub stored_name: String,
    pub file_hash: String,
    pub content_type: String,
    pub size: i64,
}

/// Link `file_id` to `post_id` on an existing connection.
///
/// Linking a file again to the post it already belongs to is a no-op.
/// A file attached to another post yields `TwokError::Conflict`.
pub(crate) async fn link_to_post(
    conn: &mut DbConnection,
    file_id: i64,
    post_id: i64,
) -> Result<()> {
    let linked = sqlx::query(
        "UPDATE files SET post_id = $1
         WHERE file_id = $2 AND (post_id IS NULL OR post_id = $1)",
    )
    .bind(post_id)
    .bind(file_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if linked > 0 {
        return Ok(());
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM files WHERE file_id = $1)")
        .bind(file_id)
        .fetch_one(&mut *conn)
        .await?;
    if exists {
        Err(TwokError::Conflict("attachment link".to_string()))
    } else {
        Err(TwokError::NotFound("file".to_string()))
    }
}

/// Repository for attachment metadata.
pub struct AttachmentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AttachmentRepository<'a> {
    /// Create a new AttachmentRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record an upload. The new attachment is not linked to any post.
    pub async fn create(&self, new_attachment: &NewAttachment) -> Result<Attachment> {
        let sql = format!(
            "INSERT INTO files (file_name, stored_name, file_hash, content_type, size, created_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ATTACHMENT_COLUMNS}"
        );
        let attachment = sqlx::query_as(&sql)
            .bind(&new_attachment.file_name)
            .bind(&new_attachment.stored_name)
            .bind(&new_attachment.file_hash)
            .bind(&new_attachment.content_type)
            .bind(new_attachment.size)
            .bind(datetime::now())
            .fetch_one(self.pool)
            .await?;

        Ok(attachment)
    }

    /// Get an attachment by ID.
    pub async fn get_by_id(&self, file_id: i64) -> Result<Option<Attachment>> {
        let sql = format!("SELECT {ATTACHMENT_COLUMNS} FROM files WHERE file_id = $1");
        let attachment = sqlx::query_as(&sql)
            .bind(file_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(attachment)
    }

    /// List the files attached to a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Attachment>> {
        let sql = format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM files WHERE post_id = $1 ORDER BY file_id ASC"
        );
        let attachments = sqlx::query_as(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await?;

        Ok(attachments)
    }

    /// List the files attached to any of `post_ids`, ordered by file ID.
    pub async fn list_by_posts(&self, post_ids: &[i64]) -> Result<Vec<Attachment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<DbBackend> = QueryBuilder::new(format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM files WHERE post_id IN ("
        ));
        let mut separated = query.separated(", ");
        for post_id in post_ids {
            separated.push_bind(*post_id);
        }
        separated.push_unseparated(") ORDER BY file_id ASC");

        let attachments = query
            .build_query_as::<Attachment>()
            .fetch_all(self.pool).await?;
        Ok(attachments)
    }

    /// Attach a file to a post.
    pub async fn attach_to_post(&self, file_id: i64, post_id: i64) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        link_to_post(&mut conn, file_id, post_id).await
    }
}
