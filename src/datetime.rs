//! Date/time utilities for twok.
//!
//! All timestamps written by the application come from [`now`], so posts,
//! replies and requester records are compared against a single clock.

use chrono::{DateTime, SubsecRound, Utc};

/// Current time in UTC, truncated to microseconds.
///
/// PostgreSQL keeps microsecond precision, so truncating here makes a
/// timestamp read back from any backend compare equal to the value written.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a timestamp as RFC3339 with a trailing `Z`.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}
