//! Photo ingestion into data-URIs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
#[cfg(test)]
use mockall::automock;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Where a submitted photo comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// A newly uploaded file, to be read and embedded
    Upload(PathBuf),
    /// A reference kept from an earlier submission (data-URI or path)
    Existing(String),
    /// No photo
    None,
}

impl PhotoSource {
    /// Prefers a fresh upload, falling back to the kept reference
    pub fn from_form(upload: Option<PathBuf>, existing: Option<String>) -> Self {
        match (upload, existing) {
            (Some(path), _) => Self::Upload(path),
            (None, Some(reference)) if !reference.trim().is_empty() => Self::Existing(reference),
            _ => Self::None,
        }
    }
}

/// Resolves a photo source to the reference stored on the user.
///
/// A load is fulfilled or rejected exactly once; there are no partial reads.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PhotoLoader: Send + Sync {
    async fn load(&self, source: PhotoSource) -> Result<Option<String>, DomainError>;
}

/// Reads uploads from the filesystem and embeds them as base64 data-URIs
#[derive(Debug, Clone, Default)]
pub struct FilePhotoLoader {
    max_bytes: Option<u64>,
}

impl FilePhotoLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects uploads larger than `max_bytes`
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    async fn read_data_uri(&self, path: &Path) -> Result<String, DomainError> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            DomainError::photo_ingestion(format!("Cannot access '{}': {}", path.display(), e))
        })?;

        if let Some(max) = self.max_bytes {
            let size = file
                .metadata()
                .await
                .map_err(|e| {
                    DomainError::photo_ingestion(format!(
                        "Cannot access '{}': {}",
                        path.display(),
                        e
                    ))
                })?
                .len();

            if size > max {
                return Err(too_large(path, max));
            }
        }

        let bytes = read_bounded(file, self.max_bytes, path).await?;

        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!(path = %path.display(), size = bytes.len(), mime = %mime, "Embedded photo upload");

        Ok(format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(&bytes)))
    }
}

/// Reads the whole upload, stopping one byte past `max_bytes` so that a file
/// that grew after the size check is still rejected
async fn read_bounded<R>(
    mut reader: R,
    max_bytes: Option<u64>,
    path: &Path,
) -> Result<Vec<u8>, DomainError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();

    let read = match max_bytes {
        Some(max) => reader.take(max + 1).read_to_end(&mut bytes).await,
        None => reader.read_to_end(&mut bytes).await,
    };
    read.map_err(|e| {
        DomainError::photo_ingestion(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    match max_bytes {
        Some(max) if bytes.len() as u64 > max => Err(too_large(path, max)),
        _ => Ok(bytes),
    }
}

fn too_large(path: &Path, max: u64) -> DomainError {
    warn!(path = %path.display(), max, "Photo upload too large");
    DomainError::photo_ingestion(format!(
        "'{}' is above the {} byte limit",
        path.display(),
        max
    ))
}

#[async_trait]
impl PhotoLoader for FilePhotoLoader {
    async fn load(&self, source: PhotoSource) -> Result<Option<String>, DomainError> {
        match source {
            PhotoSource::Upload(path) => self.read_data_uri(&path).await.map(Some),
            PhotoSource::Existing(reference) => Ok(Some(reference)),
            PhotoSource::None => Ok(None),
        }
    }
}
