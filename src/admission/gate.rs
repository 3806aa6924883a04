//! Post admission gate for twok.
//!
//! Decides whether a requester may post right now, based on the minimum
//! interval between posts from one IP address.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::repository::RequesterRepository;
use crate::db::Database;
use crate::{Result, TwokError};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The post may proceed; the requester's last post time was set.
    Admitted,
    /// The requester posted too recently.
    Rejected {
        /// Time left until the requester may post again.
        retry_after: Duration,
    },
}

impl Admission {
    /// Check if the post is admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// Convert a rejection into `TwokError::RateLimited`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Admission::Admitted => Ok(()),
            Admission::Rejected { retry_after } => Err(TwokError::RateLimited { retry_after }),
        }
    }
}

/// Gate consulted before every post creation.
pub struct PostAdmissionGate<'a> {
    db: &'a Database,
    interval: Duration,
}

impl<'a> PostAdmissionGate<'a> {
    /// Create a gate enforcing `interval` between posts of one requester.
    pub fn new(db: &'a Database, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Check and record a post attempt from `ip_address` at `now`.
    ///
    /// An unknown IP is always admitted. A rejected attempt leaves the
    /// ledger unchanged.
    pub async fn check(&self, ip_address: &str, now: DateTime<Utc>) -> Result<Admission> {
        let interval = chrono::Duration::from_std(self.interval)
            .map_err(|e| TwokError::Config(format!("post interval out of range: {}", e)))?;
        let repo = RequesterRepository::new(self.db.pool());

        if repo.try_record(ip_address, now, now - interval).await? {
            debug!(ip = %ip_address, "post admitted");
            return Ok(Admission::Admitted);
        }

        let retry_after = match repo.get_by_ip(ip_address).await? {
            Some(requester) => (requester.last_post_time + interval - now)
                .to_std()
                .unwrap_or(Duration::ZERO),
            None => self.interval,
        };
        warn!(
            ip = %ip_address,
            retry_after_ms = retry_after.as_millis() as u64,
            "post rejected: too frequent"
        );
        Ok(Admission::Rejected { retry_after })
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::datetime;

    const INTERVAL: Duration = Duration::from_secs(1);

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn last_post_time(db: &Database, ip: &str) -> Option<DateTime<Utc>> {
        RequesterRepository::new(db.pool())
            .get_by_ip(ip)
            .await
            .unwrap()
            .map(|r| r.last_post_time)
    }

    #[tokio::test]
    async fn test_first_post_is_admitted() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, INTERVAL);
        let now = datetime::now();

        let admission = gate.check("192.168.1.1", now).await.unwrap();

        assert!(admission.is_admitted());
        assert_eq!(last_post_time(&db, "192.168.1.1").await, Some(now));
    }

    #[tokio::test]
    async fn test_second_post_within_interval_is_rejected() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, INTERVAL);
        let first = datetime::now();
        gate.check("192.168.1.1", first).await.unwrap();

        let second = first + chrono::Duration::milliseconds(300);
        let admission = gate.check("192.168.1.1", second).await.unwrap();

        assert_eq!(
            admission,
            Admission::Rejected {
                retry_after: Duration::from_millis(700)
            }
        );
        assert_eq!(last_post_time(&db, "192.168.1.1").await, Some(first));
    }

    #[tokio::test]
    async fn test_second_post_after_interval_is_admitted() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, INTERVAL);
        let first = datetime::now();
        gate.check("192.168.1.1", first).await.unwrap();

        let second = first + chrono::Duration::milliseconds(1500);
        let admission = gate.check("192.168.1.1", second).await.unwrap();

        assert!(admission.is_admitted());
        assert_eq!(last_post_time(&db, "192.168.1.1").await, Some(second));
    }

    #[tokio::test]
    async fn test_exactly_at_interval_is_admitted() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, INTERVAL);
        let first = datetime::now();
        gate.check("192.168.1.1", first).await.unwrap();

        let second = first + chrono::Duration::seconds(1);
        assert!(gate.check("192.168.1.1", second).await.unwrap().is_admitted());
    }

    #[tokio::test]
    async fn test_clock_going_backwards_is_rejected() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, INTERVAL);
        let first = datetime::now();
        gate.check("192.168.1.1", first).await.unwrap();

        let earlier = first - chrono::Duration::seconds(5);
        let admission = gate.check("192.168.1.1", earlier).await.unwrap();

        assert!(!admission.is_admitted());
        assert_eq!(last_post_time(&db, "192.168.1.1").await, Some(first));
    }

    #[tokio::test]
    async fn test_zero_interval_always_admits() {
        let db = setup_db().await;
        let gate = PostAdmissionGate::new(&db, Duration::ZERO);
        let now = datetime::now();

        assert!(gate.check("192.168.1.1", now).await.unwrap().is_admitted());
        assert!(gate.check("192.168.1.1", now).await.unwrap().is_admitted());
    }

    #[test]
    fn test_into_result() {
        assert!(Admission::Admitted.into_result().is_ok());
        let err = Admission::Rejected {
            retry_after: Duration::from_millis(250),
        }
        .into_result()
        .unwrap_err();
        assert!(matches!(
            err,
            TwokError::RateLimited { retry_after } if retry_after == Duration::from_millis(250)
        ));
    }
}
