use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::ResultExt;

use crate::ext::run_blocking;
use crate::mapper::MapError;
use crate::mapper::mapper::StatSnafu;
use crate::node::{EntryType, File, Folder, Node};

/// The filesystem operations a traversal needs.
///
/// Traversals run on a single-threaded runtime, so the returned futures are
/// not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait EntrySource {
    /// Type of the entry at `path`, following symlinks.
    async fn stat(&self, path: &Path) -> io::Result<EntryType>;

    /// Names of the entries inside the directory at `path`.
    async fn list(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads the local filesystem through compio.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompioSource;

impl EntrySource for CompioSource {
    async fn stat(&self, path: &Path) -> io::Result<EntryType> {
        let metadata = fs::metadata(path).await?;
        Ok(EntryType::from_metadata(metadata.is_dir(), metadata.is_file()))
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        let dir = path.to_path_buf();
        run_blocking(move || {
            std::fs::read_dir(&dir)?
                .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
                .collect()
        })
        .await
    }
}

/// Creates the node for `path`, typed by a stat call.
pub(crate) async fn materialize<S: EntrySource>(
    source: &S,
    path: PathBuf,
    parent: &Folder,
) -> Result<Node, MapError> {
    let kind = source
        .stat(&path)
        .await
        .context(StatSnafu { path: path.clone() })?;

    Ok(match kind {
        EntryType::Directory => Folder::new(path, parent.downgrade()).into(),
        kind => File::new(path, kind, parent.downgrade()).into(),
    })
}
