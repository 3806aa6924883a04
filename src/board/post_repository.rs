//! Post repository for twok.
//!
//! This module provides CRUD operations for posts in the database.

use super::post::{NewPost, Post};
use super::thread;
use crate::board::{like_pattern, search_key};
use crate::datetime;
use crate::file::link_to_post;
use crate::db::DbPool;
use crate::Result;

const POST_COLUMNS: &str = "post_id, board_id, parent_id, title, message, date, latest_reply_date";

/// Repository for post CRUD operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post.
    ///
    /// The insert, the thread root update and the attachment link run in one
    /// transaction. If `file_id` names a file that is already attached to a
    /// post, nothing is written and `TwokError::Conflict` is returned.
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO posts (board_id, parent_id, title, search_title, message, date)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {POST_COLUMNS}"
        );
        let post: Post = sqlx::query_as(&sql)
            .bind(new_post.board_id)
            .bind(new_post.parent_id)
            .bind(&new_post.title)
            .bind(search_key(&new_post.title))
            .bind(&new_post.message)
            .bind(datetime::now())
            .fetch_one(&mut *tx)
            .await?;

        thread::touch_root(&mut *tx, &post).await?;

        if let Some(file_id) = new_post.file_id {
            link_to_post(&mut *tx, file_id, post.post_id).await?;
        }

        // Re-read so a root post reports the latest_reply_date just stamped.
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1");
        let post: Post = sqlx::query_as(&sql)
            .bind(post.post_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, post_id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1");
        let post = sqlx::query_as(&sql)
            .bind(post_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(post)
    }

    /// List all posts ordered by ID, with offset/limit.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY post_id ASC LIMIT $1 OFFSET $2"
        );
        let posts = sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(posts)
    }

    /// List the thread roots of a board, most recently active first.
    pub async fn list_roots_by_board(
        &self,
        board_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE board_id = $1 AND parent_id IS NULL
             ORDER BY latest_reply_date DESC, post_id DESC
             LIMIT $2 OFFSET $3"
        );
        let posts = sqlx::query_as(&sql)
            .bind(board_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(posts)
    }

    /// Count the thread roots of a board.
    pub async fn count_roots_by_board(&self, board_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE board_id = $1 AND parent_id IS NULL",
        )
        .bind(board_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// List the direct replies to a post, oldest first.
    pub async fn list_replies(&self, parent_id: i64) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE parent_id = $1 ORDER BY post_id ASC"
        );
        let posts = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_all(self.pool)
            .await?;

        Ok(posts)
    }

    /// Case-insensitive substring search on post titles.
    ///
    /// With `board_id` set, only posts of that board are matched.
    pub async fn search(
        &self,
        query: &str,
        board_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let pattern = like_pattern(query);

        let posts = match board_id {
            Some(board_id) => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts
                     WHERE board_id = $1 AND search_title LIKE $2 ESCAPE '\\'
                     ORDER BY post_id ASC LIMIT $3 OFFSET $4"
                );
                sqlx::query_as(&sql)
                    .bind(board_id)
                    .bind(pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts
                     WHERE search_title LIKE $1 ESCAPE '\\'
                     ORDER BY post_id ASC LIMIT $2 OFFSET $3"
                );
                sqlx::query_as(&sql)
                    .bind(pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(self.pool)
                    .await?
            }
        };

        Ok(posts)
    }
}
