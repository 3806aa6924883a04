//! Requester ledger for twok.
//!
//! Stores the last admitted post time per IP address. Admission is decided
//! and recorded by a single conditional upsert so that two concurrent
//! requests from one IP cannot both be admitted.

use chrono::{DateTime, Utc};

use super::requester::Requester;
use crate::db::DbPool;
use crate::Result;

/// Repository for the requester ledger.
pub struct RequesterRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RequesterRepository<'a> {
    /// Create a new RequesterRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Get the ledger entry for an IP address.
    pub async fn get_by_ip(&self, ip_address: &str) -> Result<Option<Requester>> {
        let requester = sqlx::query_as(
            "SELECT ip_address, last_post_time FROM requesters WHERE ip_address = $1",
        )
        .bind(ip_address)
        .fetch_optional(self.pool)
        .await?;

        Ok(requester)
    }

    /// Record a post at `now` if the previous one is not later than `cutoff`.
    ///
    /// Inserts the entry for an unknown IP. Returns `false` and leaves the
    /// entry untouched when the last post is more recent than `cutoff`.
    pub async fn try_record(
        &self,
        ip_address: &str,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
    ) -> Result<bool> {
        let recorded: Option<String> = sqlx::query_scalar(
            "INSERT INTO requesters (ip_address, last_post_time) VALUES ($1, $2)
             ON CONFLICT (ip_address) DO UPDATE SET last_post_time = excluded.last_post_time
             WHERE requesters.last_post_time <= $3
             RETURNING ip_address",
        )
        .bind(ip_address)
        .bind(now)
        .bind(cutoff)
        .fetch_optional(self.pool)
        .await?;

        Ok(recorded.is_some())
    }
}
