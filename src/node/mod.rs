//! Mirror nodes.
//!
//! A mirrored entry is either a [`File`] or a [`Folder`]. Folders own their
//! children; every node keeps a weak back-reference to the folder it is
//! attached to, which is only used to detach it again.

mod entry;
mod file;
mod folder;
mod node;
mod reserved;

pub use entry::EntryType;
pub(crate) use entry::EntryMeta;
pub use file::File;
pub use folder::Folder;
pub(crate) use folder::FolderInner;
pub use node::{Node, NodeError};
pub use reserved::{RESERVED_KEYS, is_reserved_key};
