//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{not_empty_trimmed, single_line};

/// Board creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board name (unique).
    #[validate(
        length(min = 1, max = 128, message = "Must be 1 to 128 characters"),
        custom(function = "single_line")
    )]
    pub name: String,
}

/// Post creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post title.
    #[validate(
        length(min = 1, max = 128, message = "Must be 1 to 128 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub title: String,
    /// Post body.
    #[serde(default)]
    #[validate(length(max = 512, message = "Must be at most 512 characters"))]
    pub message: Option<String>,
    /// Name of the target board.
    #[validate(length(min = 1, max = 128, message = "Must be 1 to 128 characters"))]
    pub board_name: String,
    /// Post being replied to.
    #[serde(default)]
    pub parent_id: Option<i64>,
    /// Previously uploaded attachment to link.
    #[serde(default)]
    pub file_id: Option<i64>,
}

/// Page selection query (`?page=N`, 1-based).
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number, defaulting to 1.
    pub page: Option<u32>,
}

/// Optional board scope for post search (`?board_name=...`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchScopeQuery {
    /// Restrict the search to this board.
    pub board_name: Option<String>,
}
