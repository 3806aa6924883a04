//! API handlers for the twok HTTP surface.

pub mod board;
pub mod file;
pub mod post;
pub mod search;

pub use board::*;
pub use file::*;
pub use post::*;
pub use search::*;

use std::sync::Arc;

use crate::admission::PostAdmissionGate;
use crate::board::{BoardService, Post};
use crate::config::BoardSettings;
use crate::file::{Attachment, AttachmentRepository, FileStorage, DEFAULT_MAX_UPLOAD_SIZE};
use crate::Database;

/// Database shared across handlers. The pool inside is already thread-safe.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// Page size and post interval.
    pub settings: BoardSettings,
    /// Attachment storage (file endpoints fail without it).
    pub file_storage: Option<FileStorage>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Take the client IP from proxy headers.
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, settings: BoardSettings) -> Self {
        Self {
            db,
            settings,
            file_storage: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            trust_proxy_headers: false,
        }
    }

    /// Enable file storage with the given upload limit in megabytes.
    pub fn with_file_storage(mut self, storage: FileStorage, max_upload_size_mb: u64) -> Self {
        self.file_storage = Some(storage);
        self.max_upload_size = max_upload_size_mb * 1024 * 1024;
        self
    }

    /// Honour X-Forwarded-For / X-Real-IP when identifying clients.
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Board service over this state's database and settings.
    pub fn board_service(&self) -> BoardService<'_> {
        BoardService::new(&self.db, self.settings)
    }

    /// Files attached to any of `posts`, in one query.
    pub async fn attachments_for<'p>(
        &self,
        posts: impl IntoIterator<Item = &'p Post>,
    ) -> crate::Result<Vec<Attachment>> {
        let post_ids: Vec<i64> = posts.into_iter().map(|post| post.post_id).collect();
        AttachmentRepository::new(self.db.pool())
            .list_by_posts(&post_ids)
            .await
    }

    /// Admission gate enforcing the configured post interval.
    pub fn admission_gate(&self) -> PostAdmissionGate<'_> {
        PostAdmissionGate::new(&self.db, self.settings.post_time_limit)
    }
}
