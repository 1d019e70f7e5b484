//! Keeping a mirror current.
//!
//! A [`ChangeSource`] turns filesystem notifications for a directory into a
//! [`ChangeStream`]; a [`WatchRemapper`] consumes that stream and remaps the
//! watched folder in place, coalescing bursts of events into one remap.

mod remapper;
mod source;

use std::path::PathBuf;

use snafu::Snafu;

use crate::ext::BestEffortPathExt;

pub use remapper::WatchRemapper;
pub use source::{ChangeEvent, ChangeSource, ChangeStream, ManualSource, NotifySource};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WatchError {
    #[snafu(display("Failed to create filesystem watcher"))]
    WatcherError { source: notify::Error },
    #[snafu(display("Failed to watch {}", path.best_effort_path_display()))]
    SubscribeError { path: PathBuf, source: notify::Error },
}
