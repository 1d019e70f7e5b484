use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::mapper::{CompioSource, EntrySource};
use crate::node::EntryType;

/// A temporary directory populated from `(relative path, content)` pairs.
pub(crate) struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    pub(crate) fn new(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        for (relative, content) in files {
            let path = dir.path().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
            }
            std::fs::write(&path, content).expect("Failed to write fixture file");
        }
        Self { dir }
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// `hello.js`, `second/world.json`, `second/third/hello.js`.
pub(crate) fn sample_tree() -> TreeFixture {
    TreeFixture::new(&[
        ("hello.js", "world"),
        ("second/world.json", r#"{"my":"World"}"#),
        ("second/third/hello.js", "world"),
    ])
}

/// Delegates to the local filesystem except for the paths it is told to
/// break: `stat` fails for `failing`, never completes for `stuck` and
/// reports `unknown` as neither file nor directory; `list` fails for
/// `unlistable`.
#[derive(Debug, Default)]
pub(crate) struct FaultySource {
    failing: Option<PathBuf>,
    stuck: Option<PathBuf>,
    unlistable: Option<PathBuf>,
    unknown: Option<PathBuf>,
}

impl FaultySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, path: PathBuf) -> Self {
        self.failing = Some(path);
        self
    }

    pub(crate) fn stuck(mut self, path: PathBuf) -> Self {
        self.stuck = Some(path);
        self
    }

    pub(crate) fn unlistable(mut self, path: PathBuf) -> Self {
        self.unlistable = Some(path);
        self
    }

    pub(crate) fn unknown(mut self, path: PathBuf) -> Self {
        self.unknown = Some(path);
        self
    }
}

impl EntrySource for FaultySource {
    async fn stat(&self, path: &Path) -> io::Result<EntryType> {
        if self.failing.as_deref() == Some(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        if self.stuck.as_deref() == Some(path) {
            futures::future::pending::<()>().await;
        }
        if self.unknown.as_deref() == Some(path) {
            return Ok(EntryType::Unknown);
        }
        CompioSource.stat(path).await
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        if self.unlistable.as_deref() == Some(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        CompioSource.list(path).await
    }
}
