use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Weak;

use futures::future::join_all;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::ext::BestEffortPathExt;
use crate::mapper::levels::map_levels;
use crate::mapper::merge::merge_entry;
use crate::mapper::traversal::{Layout, Traversal};
use crate::mapper::{CancellationToken, CompioSource, EntrySource, MapOptions, MapRequest, RequestError};
use crate::node::{EntryType, File, Folder, Node};

/// Builds in-memory mirrors of directory trees.
///
/// Every traversal started by a mapper runs under a child of its
/// cancellation token, so [`CancellationToken::cancel`] on
/// [`Mapper::cancellation_token`] stops all of them.
#[derive(Debug, Default)]
pub struct Mapper<S = CompioSource> {
    source: S,
    token: CancellationToken,
}

/// Result of [`Mapper::map_batch`].
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub tree: HashMap<String, Node>,
    /// Failures in request order. Successful items are still in `tree`.
    pub errors: Vec<MapError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: EntrySource> Mapper<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            token: CancellationToken::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Maps the root named by `request`.
    ///
    /// A root that is not a directory comes back as a detached [`File`].
    pub async fn map(&self, request: impl Into<MapRequest>) -> Result<Node, MapError> {
        let resolved = request.into().resolve().context(InvalidRequestSnafu)?;
        self.map_path(&resolved.root, &resolved.options).await
    }

    pub async fn map_path(&self, root: &Path, options: &MapOptions) -> Result<Node, MapError> {
        let kind = self
            .source
            .stat(root)
            .await
            .context(StatSnafu { path: root.to_path_buf() })?;

        if kind != EntryType::Directory {
            debug!(
                "{} is not a directory, mapping it as a single {}",
                root.best_effort_path_display(),
                kind
            );
            return Ok(File::new(root.to_path_buf(), kind, Weak::new()).into());
        }

        let folder = Folder::new_root(root.to_path_buf());
        self.map_into(&folder, options).await?;
        info!(
            "Mapped {} with {} top-level entries",
            root.best_effort_path_display(),
            folder.len()
        );
        Ok(folder.into())
    }

    /// Populates `folder` from the directory at its path.
    pub async fn map_into(&self, folder: &Folder, options: &MapOptions) -> Result<(), MapError> {
        let token = self.token.child();
        match options.levels {
            Some(levels) => map_levels(&self.source, token, folder, levels, options).await,
            None => {
                Traversal::new(
                    &self.source,
                    &options.filter,
                    &options.key_style,
                    Layout::Nested,
                    token,
                )
                .keep_empty(options.keep_empty_folders)
                .run(folder.clone(), folder.path().to_path_buf())
                .await
            }
        }
    }

    /// Clears `folder` and maps its directory again.
    ///
    /// The new children are collected off to the side and swapped in only
    /// once the traversal succeeds; a failed remap leaves `folder` empty.
    /// The folder handle itself, and with it its place in a larger tree,
    /// is preserved.
    ///
    /// Remaps of the same folder never overlap: a remap waits for the one in
    /// flight to finish before clearing anything.
    pub async fn remap(&self, folder: &Folder, options: &MapOptions) -> Result<(), MapError> {
        let _in_flight = folder.lock_remap().await;
        folder.clear();
        let staging = Folder::new_root(folder.path().to_path_buf());
        self.map_into(&staging, options).await?;
        folder.replace_children(&staging);
        debug!(
            "Remapped {} with {} top-level entries",
            folder.path().best_effort_path_display(),
            folder.len()
        );
        Ok(())
    }

    /// Maps every request concurrently and merges the results by name.
    ///
    /// Items are keyed by [`MapRequest::name`], or the base name of their
    /// root. Results sharing a key are merged in request order.
    pub async fn map_batch(&self, items: impl IntoIterator<Item = MapRequest>) -> BatchOutcome {
        let items: Vec<MapRequest> = items.into_iter().collect();
        let results = join_all(items.iter().map(|item| self.map(item.clone()))).await;

        let mut outcome = BatchOutcome::default();
        for (item, result) in items.into_iter().zip(results) {
            match result {
                Ok(node) => {
                    let key = item.name.unwrap_or_else(|| node.name().to_string());
                    merge_entry(&mut outcome.tree, key, node);
                }
                Err(error) => {
                    warn!("Failed to map {}: {}", item.path.as_deref().unwrap_or("<none>"), error);
                    outcome.errors.push(error);
                }
            }
        }
        outcome
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MapError {
    #[snafu(display("Failed to stat {}", path.best_effort_path_display()))]
    StatError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to list directory {}", path.best_effort_path_display()))]
    ListError { path: PathBuf, source: io::Error },
    #[snafu(display("Mapping was cancelled"))]
    Cancelled,
    #[snafu(display("Invalid mapping request"))]
    InvalidRequestError { source: RequestError },
}
