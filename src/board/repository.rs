//! Board repository for twok.
//!
//! This module provides CRUD operations for boards in the database.

use super::types::{Board, NewBoard};
use crate::board::{like_pattern, search_key};
use crate::datetime;
use crate::db::DbPool;
use crate::{Result, TwokError};

/// Repository for board CRUD operations.
pub struct BoardRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> BoardRepository<'a> {
    /// Create a new BoardRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new board in the database.
    ///
    /// Returns `TwokError::Conflict` if the name is already taken.
    pub async fn create(&self, new_board: &NewBoard) -> Result<Board> {
        sqlx::query_as(
            "INSERT INTO boards (name, search_name, created_at) VALUES ($1, $2, $3)
             RETURNING board_id, name, created_at",
        )
        .bind(&new_board.name)
        .bind(search_key(&new_board.name))
        .bind(datetime::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                TwokError::Conflict("board".to_string())
            }
            _ => TwokError::Database(e.to_string()),
        })
    }

    /// Get a board by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Board>> {
        let board = sqlx::query_as("SELECT board_id, name, created_at FROM boards WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(board)
    }

    /// List boards ordered by creation, with offset/limit.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Board>> {
        let boards = sqlx::query_as(
            "SELECT board_id, name, created_at FROM boards
             ORDER BY board_id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(boards)
    }

    /// Case-insensitive substring search on board names.
    pub async fn search(&self, query: &str, offset: i64, limit: i64) -> Result<Vec<Board>> {
        let boards = sqlx::query_as(
            "SELECT board_id, name, created_at FROM boards
             WHERE search_name LIKE $1 ESCAPE '\\'
             ORDER BY board_id ASC LIMIT $2 OFFSET $3",
        )
        .bind(like_pattern(query))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(boards)
    }
}
