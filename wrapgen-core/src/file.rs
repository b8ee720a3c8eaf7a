use std::path::{Path, PathBuf};

use eyre::{Context, Result};

/// A generated file waiting to be written.
pub struct OutputFile {
    path: PathBuf,
    content: String,
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had identical content
    Unchanged,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the file, creating parent directories. Files whose content is
    /// already up to date are left untouched so their mtime does not change.
    pub fn write(&self) -> Result<WriteResult> {
        if std::fs::read_to_string(&self.path).is_ok_and(|existing| existing == self.content) {
            return Ok(WriteResult::Unchanged);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
        }
        std::fs::write(&self.path, &self.content)
            .wrap_err_with(|| format!("failed to write '{}'", self.path.display()))?;
        Ok(WriteResult::Written)
    }
}
