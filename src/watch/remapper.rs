use tracing::{debug, info, warn};

use crate::ext::BestEffortPathExt;
use crate::mapper::{EntrySource, MapError, MapOptions, Mapper};
use crate::node::Folder;
use crate::watch::{ChangeSource, ChangeStream, WatchError};

/// Remaps one folder whenever its change stream fires.
///
/// Remaps run one at a time. Events that pile up while a remap is in flight
/// are folded into a single trailing remap.
#[derive(Debug)]
pub struct WatchRemapper<'m, S> {
    mapper: &'m Mapper<S>,
    folder: Folder,
    options: MapOptions,
    changes: ChangeStream,
    persistent: bool,
    done: bool,
}

impl<'m, S: EntrySource> WatchRemapper<'m, S> {
    /// A non-persistent remapper stops after its first remap.
    pub fn new(
        mapper: &'m Mapper<S>,
        folder: Folder,
        options: MapOptions,
        changes: ChangeStream,
        persistent: bool,
    ) -> Self {
        Self {
            mapper,
            folder,
            options,
            changes,
            persistent,
            done: false,
        }
    }

    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Waits for a change and remaps. `None` once the remapper is finished
    /// or its change stream has ended.
    pub async fn next_remap(&mut self) -> Option<Result<(), MapError>> {
        if self.done {
            return None;
        }

        let Some(event) = self.changes.next().await else {
            self.done = true;
            return None;
        };
        let coalesced = self.changes.drain_pending();
        debug!(
            "Change at {:?} under {}, {} more queued",
            event.paths,
            self.folder.path().best_effort_path_display(),
            coalesced
        );

        if !self.persistent {
            self.done = true;
        }

        let result = self.mapper.remap(&self.folder, &self.options).await;
        match &result {
            Ok(()) => info!(
                "Remapped {} after change",
                self.folder.path().best_effort_path_display()
            ),
            Err(error) => warn!(
                "Remap of {} failed: {}",
                self.folder.path().best_effort_path_display(),
                error
            ),
        }
        Some(result)
    }

    /// Drives the remapper to completion, handing each outcome to `on_remap`.
    pub async fn run(mut self, mut on_remap: impl FnMut(&Folder, Result<(), MapError>)) {
        while let Some(result) = self.next_remap().await {
            on_remap(&self.folder, result);
        }
    }
}

impl<S: EntrySource> Mapper<S> {
    /// Subscribes to changes under `folder` and returns the remapper that
    /// applies them.
    pub fn watch<C: ChangeSource>(
        &self,
        changes: &C,
        folder: Folder,
        options: MapOptions,
        persistent: bool,
    ) -> Result<WatchRemapper<'_, S>, WatchError> {
        let stream = changes.subscribe(folder.path())?;
        Ok(WatchRemapper::new(self, folder, options, stream, persistent))
    }

    /// Remaps `folder` on each change until the stream ends, or after the
    /// first change unless `persistent`.
    pub async fn watch_remap<C: ChangeSource>(
        &self,
        changes: &C,
        folder: Folder,
        options: MapOptions,
        persistent: bool,
        on_remap: impl FnMut(&Folder, Result<(), MapError>),
    ) -> Result<(), WatchError> {
        self.watch(changes, folder, options, persistent)?
            .run(on_remap)
            .await;
        Ok(())
    }
}
