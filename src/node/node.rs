use std::path::{Path, PathBuf};
use std::sync::Weak;

use derive_more::{From, IsVariant};
use snafu::Snafu;

use crate::ext::BestEffortPathExt;
use crate::node::{EntryType, File, Folder, FolderInner};

/// One mirrored filesystem entry.
#[derive(Debug, Clone, From, IsVariant)]
pub enum Node {
    File(File),
    Folder(Folder),
}

impl Node {
    pub fn path(&self) -> &Path {
        match self {
            Node::File(file) => file.path(),
            Node::Folder(folder) => folder.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => file.name(),
            Node::Folder(folder) => folder.name(),
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            Node::File(file) => file.extension(),
            Node::Folder(_) => "",
        }
    }

    pub fn kind(&self) -> EntryType {
        match self {
            Node::File(file) => file.kind(),
            Node::Folder(_) => EntryType::Directory,
        }
    }

    pub fn parent(&self) -> Option<Folder> {
        match self {
            Node::File(file) => file.parent(),
            Node::Folder(folder) => folder.parent(),
        }
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Node::File(file) => Some(file),
            Node::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(folder) => Some(folder),
            Node::File(_) => None,
        }
    }

    /// True when both handles refer to the same node object.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::File(a), Node::File(b)) => a.ptr_eq(b),
            (Node::Folder(a), Node::Folder(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn set_parent(&self, parent: Weak<FolderInner>) {
        match self {
            Node::File(file) => file.meta().set_parent(parent),
            Node::Folder(folder) => folder.meta().set_parent(parent),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum NodeError {
    #[snafu(display("Failed to read {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to delete {}", path.best_effort_path_display()))]
    DeleteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create directory {}", path.best_effort_path_display()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("'{}' is reserved and can not be used as an entry name", name))]
    ReservedNameError { name: String },
    #[snafu(display("'{}' is not a plain entry name", name))]
    InvalidNameError { name: String },
}
