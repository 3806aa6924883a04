//! Thread aggregation for twok.
//!
//! Replies keep their thread root's `latest_reply_date` current so boards can
//! be listed by recent activity. Both functions take a connection rather than
//! the pool so they can run inside the transaction that inserts the post.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::post::Post;
use crate::db::DbConnection;
use crate::{Result, TwokError};

/// Upper bound on parent hops when walking up to a thread root.
pub const MAX_THREAD_DEPTH: usize = 1024;

/// Find the root post ID of the thread `post` belongs to.
///
/// Walks parent references upward until a post without a parent is reached.
/// A cycle, a dangling parent reference, or a chain deeper than
/// [`MAX_THREAD_DEPTH`] is reported as `TwokError::Consistency`.
pub async fn find_root(conn: &mut DbConnection, post: &Post) -> Result<i64> {
    let mut current = post.post_id;
    let mut next = post.parent_id;
    let mut visited = HashSet::from([current]);

    while let Some(parent_id) = next {
        if !visited.insert(parent_id) {
            return Err(TwokError::Consistency(format!(
                "cycle in parent chain of post {} at post {}",
                post.post_id, parent_id
            )));
        }
        if visited.len() > MAX_THREAD_DEPTH + 1 {
            return Err(TwokError::Consistency(format!(
                "parent chain of post {} exceeds {} levels",
                post.post_id, MAX_THREAD_DEPTH
            )));
        }

        let row: Option<Option<i64>> =
            sqlx::query_scalar("SELECT parent_id FROM posts WHERE post_id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            Some(grandparent) => {
                current = parent_id;
                next = grandparent;
            }
            None => {
                return Err(TwokError::Consistency(format!(
                    "post {} references missing parent {}",
                    current, parent_id
                )));
            }
        }
    }

    Ok(current)
}

/// Record `post` as the latest activity of its thread.
///
/// Sets the root's `latest_reply_date` to the post's date unless the root
/// already carries a later one. For a root post this stamps its own date.
pub async fn touch_root(conn: &mut DbConnection, post: &Post) -> Result<i64> {
    let root_id = find_root(conn, post).await?;
    set_latest_reply_date(conn, root_id, post.date).await?;
    debug!(post_id = post.post_id, root_id, "thread root touched");
    Ok(root_id)
}

async fn set_latest_reply_date(
    conn: &mut DbConnection,
    root_id: i64,
    date: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE posts SET latest_reply_date = $1
         WHERE post_id = $2 AND (latest_reply_date IS NULL OR latest_reply_date < $1)",
    )
    .bind(date)
    .bind(root_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
