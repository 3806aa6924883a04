//! Web server for twok.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{Config, ServerConfig};
use crate::file::FileStorage;
use crate::{Database, Result, TwokError};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Per-IP request limiter.
    rate_limit: Arc<RateLimitState>,
    /// Server configuration.
    server_config: ServerConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database) -> Result<Self> {
        let server_config = &config.server;
        let addr = format!("{}:{}", server_config.host, server_config.port)
            .parse()
            .map_err(|e| TwokError::Config(format!("invalid server address: {e}")))?;

        let mut app_state = AppState::new(Arc::new(db), config.board_settings())
            .with_trust_proxy_headers(server_config.trust_proxy_headers);

        match FileStorage::new(&config.files.storage_path) {
            Ok(storage) => {
                app_state = app_state.with_file_storage(storage, config.files.max_upload_size_mb);
                tracing::info!("File storage initialized at: {}", config.files.storage_path);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize file storage: {}. File API will be disabled.",
                    e
                );
            }
        }

        let rate_limit = Arc::new(RateLimitState::new(
            server_config.api_rate_limit,
            server_config.trust_proxy_headers,
        ));

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            rate_limit,
            server_config: server_config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn build_router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            &self.server_config.cors_origins,
            Some(self.rate_limit.clone()),
        )
        .merge(create_health_router())
        .layer(CompressionLayer::new())
    }

    async fn bind(&self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.build_router();
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        self.rate_limit.clone().start_cleanup_task();
        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config(storage: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.files.storage_path = storage.path().to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let storage = TempDir::new().unwrap();
        let config = create_test_config(&storage);
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, db).unwrap();
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert!(server.app_state.file_storage.is_some());
    }

    #[tokio::test]
    async fn test_web_server_invalid_address() {
        let storage = TempDir::new().unwrap();
        let mut config = create_test_config(&storage);
        config.server.host = "not an address".to_string();
        let db = Database::open_in_memory().await.unwrap();

        let result = WebServer::new(&config, db);
        assert!(matches!(result, Err(TwokError::Config(_))));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let storage = TempDir::new().unwrap();
        let config = create_test_config(&storage);
        let db = Database::open_in_memory().await.unwrap();

        let server = WebServer::new(&config, db).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let client = reqwest::Client::new();
        let resp = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        assert_eq!(resp.text().await.unwrap(), "OK");

        let resp = client
            .get(format!("http://{}/api/board", addr))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }
}
