//! Per-IP request rate limiting for the whole API.
//!
//! This is a coarse flood guard independent of the post admission gate.

use std::{num::NonZeroU32, sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::web::error::ApiError;
use crate::web::extract::get_client_ip;

/// State for API rate limiting.
pub struct RateLimitState {
    limiter: DefaultKeyedRateLimiter<String>,
    trust_proxy_headers: bool,
}

impl RateLimitState {
    /// Create a limiter allowing `requests_per_minute` per client IP.
    pub fn new(requests_per_minute: u32, trust_proxy_headers: bool) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::keyed(quota),
            trust_proxy_headers,
        }
    }

    /// Check if a request from `ip` is allowed.
    pub fn check(&self, ip: &str) -> bool {
        self.limiter.check_key(&ip.to_string()).is_ok()
    }

    /// Drop state for clients that are back to a full quota.
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
    }

    /// Start a background task to periodically clean up old entries.
    ///
    /// This is the only background task the server runs. It touches limiter
    /// state only, never the database.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
            }
        });
    }
}

/// Rate limiting middleware for the API.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(req.headers(), req.extensions(), state.trust_proxy_headers);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");
        return ApiError::too_many_requests("Too many requests. Please try again later.", None)
            .into_response();
    }

    next.run(req).await
}
