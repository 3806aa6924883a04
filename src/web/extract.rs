//! Request extractors shared by the handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Query},
    http::{request::Parts, Extensions, HeaderMap},
};

use crate::board::Pagination;
use crate::web::dto::PageQuery;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Determine the client IP of a request.
///
/// Proxy headers (`X-Forwarded-For`, then `X-Real-IP`) are honoured only
/// when `trust_proxy_headers` is set. Falls back to the peer address, or
/// `"unknown"` when the server was not started with connect info.
pub fn get_client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        if let Some(ip) = headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return ip.to_string();
        }

        if let Some(ip) = headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return ip.to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// The requester's IP address, the unit of post admission.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(get_client_ip(
            &parts.headers,
            &parts.extensions,
            state.trust_proxy_headers,
        )))
    }
}

/// Offset/limit for the `?page=N` query under the configured page size.
///
/// A missing page means page 1; page 0 or a non-numeric page is a 400.
#[derive(Debug, Clone, Copy)]
pub struct Paging(pub Pagination);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Paging {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid page: {}", e)))?;

        let page = query.page.unwrap_or(1);
        Pagination::from_page(page, state.settings.items_per_page)
            .map(Paging)
            .ok_or_else(|| ApiError::bad_request("page must be 1 or greater"))
    }
}
