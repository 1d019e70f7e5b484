use std::io;

use compio::runtime::spawn_blocking;

/// Runs a blocking filesystem call on compio's blocking pool.
pub async fn run_blocking<T, F>(f: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + Sync + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|_| io::Error::other("blocking filesystem task panicked"))?
}
