//! Board service for twok.
//!
//! This module provides high-level operations for boards and posts with
//! input validation, existence checks and pagination support.

use tracing::{debug, info};

use crate::config::BoardSettings;
use crate::db::Database;
use crate::{Result, TwokError};

use super::post_repository::PostRepository;
use super::repository::BoardRepository;
use super::types::{Board, NewBoard};
use super::{NewPost, Post};

/// Maximum length for board names (in characters).
pub const MAX_BOARD_NAME_LENGTH: usize = 128;

/// Maximum length for post titles (in characters).
pub const MAX_TITLE_LENGTH: usize = 128;

/// Maximum length for post messages (in characters).
pub const MAX_MESSAGE_LENGTH: usize = 512;

/// Validate a board name.
pub fn validate_board_name(name: &str) -> Result<()> {
    let char_count = name.chars().count();
    if char_count == 0 || char_count > MAX_BOARD_NAME_LENGTH {
        return Err(TwokError::Validation(format!(
            "board name must be 1 to {} characters",
            MAX_BOARD_NAME_LENGTH
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(TwokError::Validation(
            "board name must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate a post title.
fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TwokError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(TwokError::Validation(format!(
            "title is too long (max {} characters)",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// Validate a post message.
fn validate_message(message: &str) -> Result<()> {
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(TwokError::Validation(format!(
            "message is too long (max {} characters)",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of items to skip.
    pub offset: i64,
    /// Maximum number of items to return.
    pub limit: i64,
}

impl Pagination {
    /// Create new pagination parameters.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Translate a 1-based page number into offset/limit.
    ///
    /// Returns `None` for page 0 or when the offset does not fit in an `i64`.
    pub fn from_page(page: u32, items_per_page: u32) -> Option<Self> {
        let index = page.checked_sub(1)?;
        let limit = i64::from(items_per_page);
        let offset = i64::from(index).checked_mul(limit)?;
        Some(Self { offset, limit })
    }
}

/// Number of pages needed for `total` items, rounded up.
pub fn page_count(total: i64, per_page: u32) -> i64 {
    if total <= 0 || per_page == 0 {
        return 0;
    }
    let per_page = i64::from(per_page);
    (total + per_page - 1) / per_page
}

/// A post submission addressed by board name.
#[derive(Debug, Clone)]
pub struct PostDraft {
    /// Name of the target board.
    pub board_name: String,
    /// Post being replied to, if any.
    pub parent_id: Option<i64>,
    /// Post title.
    pub title: String,
    /// Post body.
    pub message: Option<String>,
    /// Uploaded attachment to link.
    pub file_id: Option<i64>,
}

/// A post together with its direct replies.
#[derive(Debug, Clone)]
pub struct PostDetail {
    /// The post itself.
    pub post: Post,
    /// Direct replies, oldest first.
    pub replies: Vec<Post>,
}

/// Combined search result over posts and boards.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Posts whose title matches.
    pub posts: Vec<Post>,
    /// Boards whose name matches.
    pub boards: Vec<Board>,
}

/// Service for board and post operations.
pub struct BoardService<'a> {
    db: &'a Database,
    settings: BoardSettings,
}

impl<'a> BoardService<'a> {
    /// Create a new BoardService with the given database and settings.
    pub fn new(db: &'a Database, settings: BoardSettings) -> Self {
        Self { db, settings }
    }

    /// Pagination for a 1-based page under the configured page size.
    pub fn pagination(&self, page: u32) -> Option<Pagination> {
        Pagination::from_page(page, self.settings.items_per_page)
    }

    /// Create a board.
    ///
    /// Returns `TwokError::Conflict` if the name is taken.
    pub async fn create_board(&self, name: &str) -> Result<Board> {
        validate_board_name(name)?;

        let board = BoardRepository::new(self.db.pool())
            .create(&NewBoard::new(name))
            .await?;
        info!(board_id = board.board_id, name = %board.name, "board created");
        Ok(board)
    }

    /// Get a board by name.
    pub async fn get_board(&self, name: &str) -> Result<Board> {
        BoardRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| TwokError::NotFound("board".to_string()))
    }

    /// List boards.
    pub async fn list_boards(&self, pagination: Pagination) -> Result<Vec<Board>> {
        BoardRepository::new(self.db.pool())
            .list(pagination.offset, pagination.limit)
            .await
    }

    /// Create a post or reply.
    ///
    /// The board, and the parent if given, must exist. A reply must be in
    /// the same board as its parent.
    pub async fn create_post(&self, draft: &PostDraft) -> Result<Post> {
        validate_title(&draft.title)?;
        if let Some(message) = &draft.message {
            validate_message(message)?;
        }

        let board = self.get_board(&draft.board_name).await?;
        let post_repo = PostRepository::new(self.db.pool());

        let mut new_post = NewPost::new(board.board_id, draft.title.clone());
        if let Some(parent_id) = draft.parent_id {
            let parent = post_repo
                .get_by_id(parent_id)
                .await?
                .ok_or_else(|| TwokError::NotFound("parent post".to_string()))?;
            if parent.board_id != board.board_id {
                return Err(TwokError::Validation(
                    "reply must be posted to the board of its parent".to_string(),
                ));
            }
            new_post = new_post.with_parent(parent_id);
        }
        if let Some(message) = &draft.message {
            new_post = new_post.with_message(message.clone());
        }
        if let Some(file_id) = draft.file_id {
            new_post = new_post.with_file(file_id);
        }

        let post = post_repo.create(&new_post).await?;
        debug!(
            post_id = post.post_id,
            board_id = post.board_id,
            parent_id = ?post.parent_id,
            "post created"
        );
        Ok(post)
    }

    /// Get a post with its direct replies.
    pub async fn get_post(&self, post_id: i64) -> Result<PostDetail> {
        let post_repo = PostRepository::new(self.db.pool());
        let post = post_repo
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| TwokError::NotFound("post".to_string()))?;
        let replies = post_repo.list_replies(post_id).await?;
        Ok(PostDetail { post, replies })
    }

    /// List all posts.
    pub async fn list_posts(&self, pagination: Pagination) -> Result<Vec<Post>> {
        PostRepository::new(self.db.pool())
            .list(pagination.offset, pagination.limit)
            .await
    }

    /// List a board's thread roots, most recently active first.
    pub async fn list_board_posts(
        &self,
        board_name: &str,
        pagination: Pagination,
    ) -> Result<Vec<Post>> {
        let board = self.get_board(board_name).await?;
        PostRepository::new(self.db.pool())
            .list_roots_by_board(board.board_id, pagination.offset, pagination.limit)
            .await
    }

    /// Number of pages of thread roots in a board.
    ///
    /// A board without posts has 0 pages; a missing board is `NotFound`.
    pub async fn page_count(&self, board_name: &str) -> Result<i64> {
        let board = self.get_board(board_name).await?;
        let total = PostRepository::new(self.db.pool())
            .count_roots_by_board(board.board_id)
            .await?;
        Ok(page_count(total, self.settings.items_per_page))
    }

    /// Search post titles, optionally within one board.
    pub async fn search_posts(
        &self,
        query: &str,
        board_name: Option<&str>,
        pagination: Pagination,
    ) -> Result<Vec<Post>> {
        let board_id = match board_name {
            Some(name) => Some(self.get_board(name).await?.board_id),
            None => None,
        };
        PostRepository::new(self.db.pool())
            .search(query, board_id, pagination.offset, pagination.limit)
            .await
    }

    /// Search post titles and board names.
    pub async fn search_all(&self, query: &str, pagination: Pagination) -> Result<SearchResults> {
        let posts = PostRepository::new(self.db.pool())
            .search(query, None, pagination.offset, pagination.limit)
            .await?;
        let boards = BoardRepository::new(self.db.pool())
            .search(query, pagination.offset, pagination.limit)
            .await?;
        Ok(SearchResults { posts, boards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_from_page() {
        assert_eq!(Pagination::from_page(1, 5), Some(Pagination::new(0, 5)));
        assert_eq!(Pagination::from_page(3, 5), Some(Pagination::new(10, 5)));
        assert_eq!(Pagination::from_page(0, 5), None);
    }

    #[test]
    fn test_pagination_offset_overflow_is_rejected() {
        assert_eq!(Pagination::from_page(u32::MAX, u32::MAX), None);

        let p = Pagination::from_page(u32::MAX, 1000).unwrap();
        assert_eq!(p.offset, 4_294_967_294_000);
        assert_eq!(p.limit, 1000);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(1, 5), 1);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn test_validate_board_name() {
        assert!(validate_board_name("general").is_ok());
        assert!(validate_board_name(&"a".repeat(MAX_BOARD_NAME_LENGTH)).is_ok());
        assert!(validate_board_name("").is_err());
        assert!(validate_board_name(&"a".repeat(MAX_BOARD_NAME_LENGTH + 1)).is_err());
        assert!(validate_board_name("bad\nname").is_err());
    }

    #[test]
    fn test_validate_title_and_message() {
        assert!(validate_title("Hello").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"あ".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"あ".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_message("").is_ok());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }
}
