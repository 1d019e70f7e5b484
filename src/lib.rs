#![allow(clippy::enum_variant_names)]

//! In-memory mirrors of filesystem subtrees.
//!
//! A [`Mapper`] walks a directory concurrently and produces a [`Node`] graph
//! whose shape follows the directory hierarchy. The mirror can be filtered,
//! limited to a number of structural levels with everything deeper flattened,
//! merged from several roots and re-derived in place when the filesystem
//! reports a change.

pub mod ext;
pub mod filter;
pub mod mapper;
pub mod node;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_support;

pub use filter::{Filter, FilterOptions, KeyStyle, NamePattern};
pub use mapper::{
    BatchOutcome, CancellationToken, CompioSource, EntrySource, MapError, MapOptions, MapRequest,
    Mapper, RequestError, ResolvedRequest, merge, merge_folders,
};
pub use node::{EntryType, File, Folder, Node, NodeError};
pub use watch::{
    ChangeEvent, ChangeSource, ChangeStream, ManualSource, NotifySource, WatchError, WatchRemapper,
};
