use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use notify::{Event, EventKind, RecursiveMode, Watcher, recommended_watcher};
use parking_lot::Mutex;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::watch::{SubscribeSnafu, WatchError, WatcherSnafu};

/// Something changed below a watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub paths: Vec<PathBuf>,
}

/// Change events for one subscription. Dropping the stream unsubscribes.
pub struct ChangeStream {
    events: UnboundedReceiver<ChangeEvent>,
    _guard: Box<dyn Any>,
}

impl ChangeStream {
    pub(crate) fn new(events: UnboundedReceiver<ChangeEvent>, guard: impl Any) -> Self {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }

    /// Waits for the next event. `None` once the source has gone away.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.events.next().await
    }

    /// Discards the events that are already queued and returns how many
    /// there were.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while let Some(Some(_)) = self.events.next().now_or_never() {
            drained += 1;
        }
        drained
    }
}

impl fmt::Debug for ChangeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeStream").finish_non_exhaustive()
    }
}

pub trait ChangeSource {
    /// Starts delivering changes below `path`.
    fn subscribe(&self, path: &Path) -> Result<ChangeStream, WatchError>;
}

/// OS notifications through `notify`. Access events are ignored since
/// mapping itself produces them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifySource;

impl ChangeSource for NotifySource {
    fn subscribe(&self, path: &Path) -> Result<ChangeStream, WatchError> {
        let (sender, events) = mpsc::unbounded();
        let mut watcher = recommended_watcher(move |result: notify::Result<Event>| match result {
            Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
            Ok(event) => {
                let _ = sender.unbounded_send(ChangeEvent { paths: event.paths });
            }
            Err(error) => warn!("Filesystem watcher reported an error: {}", error),
        })
        .context(WatcherSnafu)?;

        watcher
            .watch(path, RecursiveMode::Recursive)
            .context(SubscribeSnafu { path })?;
        debug!("Watching {}", path.best_effort_path_display());

        Ok(ChangeStream::new(events, watcher))
    }
}

/// Change source driven by the caller through [`ManualSource::notify`].
///
/// Streams end once every clone of the source is dropped or
/// [`ManualSource::close`] is called.
#[derive(Debug, Clone, Default)]
pub struct ManualSource {
    subscribers: Arc<Mutex<Vec<(PathBuf, UnboundedSender<ChangeEvent>)>>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a change at `path` to every subscription at or above it.
    /// Returns the number of subscriptions notified.
    pub fn notify(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|(_, sender)| !sender.is_closed());

        let mut notified = 0;
        for (watched, sender) in subscribers.iter() {
            if !path.starts_with(watched) {
                continue;
            }
            let event = ChangeEvent {
                paths: vec![path.to_path_buf()],
            };
            if sender.unbounded_send(event).is_ok() {
                notified += 1;
            }
        }
        notified
    }

    pub fn close(&self) {
        self.subscribers.lock().clear();
    }
}

impl ChangeSource for ManualSource {
    fn subscribe(&self, path: &Path) -> Result<ChangeStream, WatchError> {
        let (sender, events) = mpsc::unbounded();
        self.subscribers.lock().push((path.to_path_buf(), sender));
        Ok(ChangeStream::new(events, ()))
    }
}
