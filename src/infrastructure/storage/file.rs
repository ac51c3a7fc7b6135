//! Directory-backed (local) backend

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::storage::KeyValueBackend;
use crate::domain::DomainError;

const BLOCK_EXTENSION: &str = "json";

/// Persistent backend storing each key as `<directory>/<key>.json`.
///
/// Writes go through a temporary file and a rename, so a block is either the
/// old or the new content, never a partial write.
#[derive(Debug, Clone)]
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    /// Opens a backend rooted at `directory`, creating it if needed
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let directory = directory.into();

        fs::create_dir_all(&directory).map_err(|e| {
            DomainError::storage(format!(
                "Failed to create storage directory '{}': {}",
                directory.display(),
                e
            ))
        })?;

        debug!(directory = %directory.display(), "Opened local storage directory");
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DomainError> {
        validate_key(key)?;
        Ok(self.directory.join(format!("{}.{}", key, BLOCK_EXTENSION)))
    }
}

/// Keys become file names: letters, digits, `-`, `_` and `.` only, and no
/// leading dot
fn validate_key(key: &str) -> Result<(), DomainError> {
    if key.is_empty() {
        return Err(DomainError::storage("Storage key cannot be empty"));
    }

    if key.starts_with('.') {
        return Err(DomainError::storage(format!(
            "Storage key '{}' cannot start with a dot",
            key
        )));
    }

    if let Some(c) = key
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '-' | '_' | '.'))
    {
        return Err(DomainError::storage(format!(
            "Storage key '{}' contains invalid character '{}'",
            key, c
        )));
    }

    Ok(())
}

impl KeyValueBackend for FileBackend {
    fn kind(&self) -> &'static str {
        "local"
    }

    fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to read '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension(format!("{}.tmp", BLOCK_EXTENSION));

        let staged = fs::write(&staging, value).map_err(|e| {
            DomainError::storage(format!("Failed to write '{}': {}", staging.display(), e))
        });

        let replaced = staged.and_then(|()| {
            fs::rename(&staging, &path).map_err(|e| {
                DomainError::storage(format!("Failed to replace '{}': {}", path.display(), e))
            })
        });

        if replaced.is_err() {
            // The staging file must not outlive a failed write
            let _ = fs::remove_file(&staging);
        }

        replaced
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to remove '{}': {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (TempDir, FileBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("storage")).unwrap();
        (dir, backend)
    }

    #[test]
    fn test_open_creates_directory() {
        let (_dir, backend) = backend();
        assert!(backend.directory().is_dir());
        assert_eq!(backend.kind(), "local");
    }

    #[test]
    fn test_set_and_get() {
        let (_dir, backend) = backend();

        backend.set("users", r#"[{"id":1}]"#).unwrap();

        assert!(backend.exists("users").unwrap());
        assert_eq!(
            backend.get("users").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert!(backend.directory().join("users.json").is_file());
        assert!(!backend.directory().join("users.json.tmp").exists());
    }

    #[test]
    fn test_get_missing() {
        let (_dir, backend) = backend();

        assert_eq!(backend.get("users").unwrap(), None);
        assert!(!backend.exists("users").unwrap());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, backend) = backend();
        backend.set("users", "[]").unwrap();

        backend.remove("users").unwrap();
        backend.remove("users").unwrap();

        assert!(!backend.exists("users").unwrap());
    }

    #[test]
    fn test_data_survives_reopen() {
        let (dir, backend) = backend();
        backend.set("users", "[]").unwrap();

        let reopened = FileBackend::open(dir.path().join("storage")).unwrap();
        assert_eq!(reopened.get("users").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_replace_removes_staging_file() {
        let (dir, backend) = backend();
        let target = dir.path().join("storage").join("users.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupied"), "x").unwrap();

        let result = backend.set("users", "[]");

        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert!(!dir.path().join("storage").join("users.json.tmp").exists());
    }

    #[test]
    fn test_rejects_unsafe_keys() {
        let (_dir, backend) = backend();

        assert!(matches!(
            backend.set("../users", "[]"),
            Err(DomainError::Storage { .. })
        ));
        assert!(backend.get("a/b").is_err());
        assert!(backend.get("").is_err());
        assert!(backend.get(".hidden").is_err());
    }
}
