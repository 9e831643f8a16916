//! File persistence capability.
//!
//! [`FileStore`] takes uploaded content and a file name and returns a
//! location string that is stored in the database instead of the content.
//! [`LocalFileStore`] writes to a directory on local disk.

use std::borrow::Cow;
use std::future::Future;
use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine as _;

use crate::config::StorageConfig;
use crate::error::CoreError;

/// Uploaded file content as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Bytes(Vec<u8>),
    /// Standard-alphabet base64 text.
    Base64(String),
}

impl FileContent {
    /// Decode into raw bytes. Invalid base64 is an `InvalidArgument`.
    pub fn decode(&self) -> Result<Cow<'_, [u8]>, CoreError> {
        match self {
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Base64(text) => general_purpose::STANDARD
                .decode(text.trim())
                .map(Cow::Owned)
                .map_err(|e| CoreError::InvalidArgument(format!("Invalid base64 content: {e}"))),
        }
    }
}

/// Persists file content and returns a retrievable location.
pub trait FileStore: Send + Sync {
    /// Save `content` under `name`, returning where it can be retrieved.
    fn save(
        &self,
        content: &FileContent,
        name: &str,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Deterministic file name for an owner's photo.
///
/// Alphanumeric characters (any script) and `-` are kept as-is. Every other
/// character is written as `%XX` per UTF-8 byte, so the result is a single
/// safe path component and distinct owner names never share a file.
pub fn owner_photo_file_name(owner_name: &str) -> String {
    let mut safe = String::with_capacity(owner_name.len());
    for c in owner_name.chars() {
        if c.is_alphanumeric() || c == '-' {
            safe.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                safe.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    format!("photo_{safe}.jpg")
}

/// Ensure `name` is a single, normal path component.
pub fn validate_file_name(name: &str) -> Result<(), CoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(CoreError::InvalidArgument(format!(
            "Invalid file name '{name}': must be a single path component"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Local disk
// ---------------------------------------------------------------------------

/// Writes files into a root directory, created on first use.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if needed and return its absolute path.
    pub async fn ensure_root(&self) -> Result<PathBuf, CoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(tokio::fs::canonicalize(&self.root).await?)
    }
}

impl FileStore for LocalFileStore {
    async fn save(&self, content: &FileContent, name: &str) -> Result<String, CoreError> {
        validate_file_name(name)?;
        let bytes = content.decode()?;

        let path = self.ensure_root().await?.join(name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored file");
        Ok(path.to_string_lossy().into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
