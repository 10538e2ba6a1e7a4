//! Single-file storage with atomic replacement.
//!
//! Writes go to a temp file in the target's directory, are synced, then
//! renamed over the target, so a crash never leaves a half-written blob.

use super::Storage;
use crate::error::{Result, StoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores the serialization in one file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&mut self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_with_path(e, &self.path)),
        }
    }

    fn write(&mut self, data: &str) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !parent.exists() {
            fs::create_dir_all(&parent).map_err(|e| StoreError::Io {
                message: format!("Failed to create directory {}", parent.display()),
                path: Some(parent.clone()),
                source: Some(e),
            })?;
        }

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| StoreError::Io {
            message: format!("Failed to create temp file in {}", parent.display()),
            path: Some(parent.clone()),
            source: Some(e),
        })?;

        write_synced(&mut temp, data).map_err(|e| StoreError::Io {
            message: format!("Failed to write temp file {}", temp.path().display()),
            path: Some(temp.path().to_path_buf()),
            source: Some(e),
        })?;

        temp.persist(&self.path).map_err(|e| StoreError::Io {
            message: format!("Failed to replace {}", self.path.display()),
            path: Some(self.path.clone()),
            source: Some(e.error),
        })?;

        debug!(path = %self.path.display(), bytes = data.len(), "Wrote store file");
        Ok(())
    }
}

fn write_synced(temp: &mut NamedTempFile, data: &str) -> std::io::Result<()> {
    temp.write_all(data.as_bytes())?;
    temp.flush()?;
    temp.as_file().sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("missing.json"));
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path().join("store.json"));

        storage.write(r#"{"a":["1",0]}"#).unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some(r#"{"a":["1",0]}"#));

        storage.write("{}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("store.json");
        let mut storage = FileStorage::new(&path);

        storage.write("{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(temp_dir.path());

        let err = storage.read().unwrap_err();
        assert!(matches!(err, StoreError::Io { path: Some(_), .. }));
    }
}
