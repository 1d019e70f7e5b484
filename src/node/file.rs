use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use compio::fs;
use snafu::ResultExt;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::node::node::{DeleteSnafu, ReadSnafu, WriteSnafu};
use crate::node::{EntryMeta, EntryType, Folder, FolderInner, NodeError};

/// A mirrored file. Content is never cached; every accessor goes to disk.
#[derive(Debug, Clone)]
pub struct File {
    meta: Arc<EntryMeta>,
}

impl File {
    pub(crate) fn new(path: PathBuf, kind: EntryType, parent: Weak<FolderInner>) -> Self {
        Self {
            meta: Arc::new(EntryMeta::new(path, kind, parent)),
        }
    }

    pub(crate) fn meta(&self) -> &EntryMeta {
        &self.meta
    }

    pub fn path(&self) -> &Path {
        self.meta.path()
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn extension(&self) -> &str {
        self.meta.extension()
    }

    /// `File` for regular files, `Unknown` for anything else that is not a directory.
    pub fn kind(&self) -> EntryType {
        self.meta.kind()
    }

    pub fn parent(&self) -> Option<Folder> {
        self.meta.parent()
    }

    pub fn ptr_eq(&self, other: &File) -> bool {
        Arc::ptr_eq(&self.meta, &other.meta)
    }

    pub async fn read(&self) -> Result<Vec<u8>, NodeError> {
        fs::read(self.path()).await.context(ReadSnafu {
            path: self.path().to_path_buf(),
        })
    }

    pub async fn read_to_string(&self) -> Result<String, NodeError> {
        let bytes = self.read().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Replaces the file content.
    pub async fn write(&self, content: impl Into<Vec<u8>>) -> Result<(), NodeError> {
        let content: Vec<u8> = content.into();
        debug!(
            "Writing {} bytes to {}",
            content.len(),
            self.path().best_effort_path_display()
        );
        fs::write(self.path(), content).await.0.context(WriteSnafu {
            path: self.path().to_path_buf(),
        })
    }

    /// Removes the file from disk and detaches it from its parent folder.
    pub async fn delete(&self) -> Result<(), NodeError> {
        fs::remove_file(self.path()).await.context(DeleteSnafu {
            path: self.path().to_path_buf(),
        })?;
        if let Some(parent) = self.parent() {
            parent.detach(self.path());
        }
        debug!("Deleted {}", self.path().best_effort_path_display());
        Ok(())
    }
}
