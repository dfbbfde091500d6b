//! Persistence of rendered export documents.

use crate::error::RenderError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Destination for rendered export files.
pub trait ExportStorage: Send + Sync {
    /// Write `contents` under `file_name` and return where it landed.
    fn write(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, RenderError>;
}

/// Stores export files in a single directory, created on first write.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// A plain file name: exactly one normal path component.
fn is_plain_file_name(file_name: &str) -> bool {
    let mut components = Path::new(file_name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl ExportStorage for DirectoryStorage {
    fn write(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, RenderError> {
        if !is_plain_file_name(file_name) {
            return Err(RenderError::InvalidFileName {
                name: file_name.to_string(),
            });
        }

        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        fs::write(&path, contents)?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "export file written");
        Ok(path)
    }
}
