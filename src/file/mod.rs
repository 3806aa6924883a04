//! File attachment module for twok.
//!
//! Uploaded content is kept on disk by [`FileStorage`]; its metadata
//! (original name, SHA-256 hash, content type, linked post) lives in the
//! `files` table behind [`AttachmentRepository`].

mod attachment;
mod storage;

pub(crate) use attachment::link_to_post;
pub use attachment::{Attachment, AttachmentRepository, NewAttachment};
pub use storage::{hash_content, FileStorage};

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Content type for an upload.
///
/// Uses the declared type when it is specific, otherwise guesses from the
/// file name.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string(),
    }
}
