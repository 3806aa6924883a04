//! Attachment blob storage for twok.
//!
//! Uploaded bytes are written under a UUID-based name in a directory sharded
//! by the first two characters of that name:
//!
//! ```text
//! {base_path}/
//! ├── 3f/
//! │   └── 3f2a9c1e-0b4d-4e7a-9c3b-2d1f0e8a7b6c.png
//! └── c0/
//!     └── c0ffee00-1234-4abc-8def-0123456789ab.bin
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Result, TwokError};

/// Lowercase hex SHA-256 digest of `content`.
pub fn hash_content(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Filesystem store for attachment content.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage rooted at `base_path`, creating it if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write `content` under a fresh stored name and return that name.
    ///
    /// The extension of `original_name` is kept, defaulting to `bin`.
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = format!(
            "{}.{}",
            Uuid::new_v4(),
            Self::extract_extension(original_name)
        );
        let file_path = self.get_file_path(&stored_name)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)?;

        Ok(stored_name)
    }

    /// Read the content stored under `stored_name`.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TwokError::NotFound(format!("stored file {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the content stored under `stored_name`.
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Full path `{base_path}/{shard}/{stored_name}` for a stored name.
    ///
    /// Names that could escape the base directory are rejected.
    fn get_file_path(&self, stored_name: &str) -> Result<PathBuf> {
        let invalid = || TwokError::Validation(format!("invalid stored name: {stored_name}"));
        if stored_name.starts_with('.') || stored_name.contains(['/', '\\']) {
            return Err(invalid());
        }
        let shard = stored_name
            .get(..2)
            .filter(|_| stored_name.len() > 2)
            .ok_or_else(invalid)?;
        Ok(self.base_path.join(shard).join(stored_name))
    }

    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
    }
}
