//! Requester model for twok.

use chrono::{DateTime, Utc};

/// A requester as seen by the post admission gate, keyed by IP address.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Requester {
    /// Client IP address (unique).
    pub ip_address: String,
    /// Time of the last admitted post.
    pub last_post_time: DateTime<Utc>,
}
