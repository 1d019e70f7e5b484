use std::path::{Path, PathBuf};
use std::sync::Weak;

use derive_more::Display;
use parking_lot::RwLock;

use crate::node::{Folder, FolderInner};

/// The kind of filesystem entry a node mirrors, fixed when the node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntryType {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
    #[display("unknown")]
    Unknown,
}

impl EntryType {
    /// Parses the names accepted in mapping requests.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "file" => Some(EntryType::File),
            "directory" | "dir" | "folder" => Some(EntryType::Directory),
            "unknown" => Some(EntryType::Unknown),
            _ => None,
        }
    }

    pub fn from_metadata(is_dir: bool, is_file: bool) -> Self {
        if is_dir {
            EntryType::Directory
        } else if is_file {
            EntryType::File
        } else {
            EntryType::Unknown
        }
    }
}

/// Identity metadata shared by files and folders.
#[derive(Debug)]
pub(crate) struct EntryMeta {
    path: PathBuf,
    name: String,
    extension: String,
    kind: EntryType,
    parent: RwLock<Weak<FolderInner>>,
}

impl EntryMeta {
    pub(crate) fn new(path: PathBuf, kind: EntryType, parent: Weak<FolderInner>) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let extension = match kind {
            EntryType::Directory => String::new(),
            _ => path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        Self {
            path,
            name,
            extension,
            kind,
            parent: RwLock::new(parent),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn extension(&self) -> &str {
        &self.extension
    }

    pub(crate) fn kind(&self) -> EntryType {
        self.kind
    }

    pub(crate) fn parent(&self) -> Option<Folder> {
        self.parent.read().upgrade().map(Folder::from_inner)
    }

    pub(crate) fn set_parent(&self, parent: Weak<FolderInner>) {
        *self.parent.write() = parent;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("file", Some(EntryType::File))]
    #[case("Directory", Some(EntryType::Directory))]
    #[case("dir", Some(EntryType::Directory))]
    #[case("unknown", Some(EntryType::Unknown))]
    #[case("json", None)]
    fn parses_entry_type_names(#[case] value: &str, #[case] expected: Option<EntryType>) {
        assert_eq!(EntryType::parse(value), expected);
    }

    #[test]
    fn extension_is_empty_for_directories() {
        let meta = EntryMeta::new(
            PathBuf::from("/tmp/archive.d"),
            EntryType::Directory,
            Weak::new(),
        );
        assert_eq!(meta.name(), "archive.d");
        assert_eq!(meta.extension(), "");
    }

    #[test]
    fn extension_strips_the_dot() {
        let meta = EntryMeta::new(PathBuf::from("/tmp/data.tar.gz"), EntryType::File, Weak::new());
        assert_eq!(meta.name(), "data.tar.gz");
        assert_eq!(meta.extension(), "gz");
        assert!(meta.parent().is_none());
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(EntryType::Directory.to_string(), "directory");
        assert_eq!(EntryType::File.to_string(), "file");
    }
}
