//! Board model for twok.

use chrono::{DateTime, Utc};

/// Board entity. Boards own a collection of posts and are never renamed.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID.
    pub board_id: i64,
    /// Board name (unique).
    pub name: String,
    /// Board creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new board.
#[derive(Debug, Clone)]
pub struct NewBoard {
    /// Board name.
    pub name: String,
}

impl NewBoard {
    /// Create a new board with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
