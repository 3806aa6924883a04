//! Board module for twok.
//!
//! This module provides the forum core:
//! - Boards with unique names
//! - Posts forming reply trees inside a board
//! - Thread root aggregation of the latest reply date
//! - Paginated listing and substring search

mod post;
mod post_repository;
mod repository;
pub mod service;
pub mod thread;
mod types;

pub use post::{NewPost, Post};
pub use post_repository::PostRepository;
pub use repository::BoardRepository;
pub use service::{
    page_count, BoardService, Pagination, PostDetail, PostDraft, SearchResults,
    MAX_BOARD_NAME_LENGTH, MAX_MESSAGE_LENGTH, MAX_TITLE_LENGTH,
};
pub use thread::MAX_THREAD_DEPTH;
pub use types::{Board, NewBoard};

/// Case-folded form of a board name or post title, stored alongside it.
///
/// Search compares against this column instead of SQL `LOWER`, which only
/// folds ASCII on SQLite.
pub(crate) fn search_key(text: &str) -> String {
    text.to_lowercase()
}

/// Build a lowercase `LIKE` pattern matching `query` as a literal substring.
///
/// Queries using it must declare `ESCAPE '\'`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
