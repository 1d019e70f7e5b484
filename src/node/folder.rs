use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use compio::fs;
use futures::lock::{Mutex, MutexGuard};
use parking_lot::RwLock;
use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::ext::{BestEffortPathExt, run_blocking};
use crate::filter::{Filter, FilterOptions};
use crate::node::node::{
    CreateDirSnafu, DeleteSnafu, InvalidNameSnafu, ReservedNameSnafu, WriteSnafu,
};
use crate::node::{EntryMeta, EntryType, File, Node, NodeError, is_reserved_key};

pub(crate) struct FolderInner {
    meta: EntryMeta,
    children: RwLock<HashMap<String, Node>>,
    /// Held for the whole of a remap so remaps of one folder never overlap.
    remap_lock: Mutex<()>,
}

impl fmt::Debug for FolderInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("path", &self.meta.path())
            .field("children", &*self.children.read())
            .finish()
    }
}

/// A mirrored directory.
///
/// Cloning a `Folder` clones the handle, not the subtree: every clone sees
/// the same children, and a remap updates them in place for all holders.
#[derive(Debug, Clone)]
pub struct Folder {
    inner: Arc<FolderInner>,
}

impl Folder {
    pub(crate) fn new(path: PathBuf, parent: Weak<FolderInner>) -> Self {
        Self {
            inner: Arc::new(FolderInner {
                meta: EntryMeta::new(path, EntryType::Directory, parent),
                children: RwLock::new(HashMap::new()),
                remap_lock: Mutex::new(()),
            }),
        }
    }

    /// A folder that is not attached anywhere.
    pub fn new_root(path: PathBuf) -> Self {
        Self::new(path, Weak::new())
    }

    pub(crate) fn from_inner(inner: Arc<FolderInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<FolderInner> {
        Arc::downgrade(&self.inner)
    }

    /// Waits until no other remap of this folder is in flight.
    pub(crate) async fn lock_remap(&self) -> MutexGuard<'_, ()> {
        self.inner.remap_lock.lock().await
    }

    #[cfg(test)]
    pub(crate) fn is_remapping(&self) -> bool {
        self.inner.remap_lock.try_lock().is_none()
    }

    pub(crate) fn meta(&self) -> &EntryMeta {
        &self.inner.meta
    }

    pub fn path(&self) -> &Path {
        self.inner.meta.path()
    }

    pub fn name(&self) -> &str {
        self.inner.meta.name()
    }

    pub fn parent(&self) -> Option<Folder> {
        self.inner.meta.parent()
    }

    pub fn ptr_eq(&self, other: &Folder) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn get(&self, key: &str) -> Option<Node> {
        self.inner.children.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.children.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.children.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.children.read().is_empty()
    }

    /// Child keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.children.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Children sorted by key.
    pub fn children(&self) -> Vec<(String, Node)> {
        let mut children: Vec<(String, Node)> = self
            .inner
            .children
            .read()
            .iter()
            .map(|(key, node)| (key.clone(), node.clone()))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));
        children
    }

    /// Keys of children that are files (including entries of unknown type).
    pub fn files(&self) -> Vec<String> {
        self.keys_where(|node| node.is_file())
    }

    /// Keys of children that are folders.
    pub fn folders(&self) -> Vec<String> {
        self.keys_where(|node| node.is_folder())
    }

    fn keys_where(&self, predicate: impl Fn(&Node) -> bool) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .children
            .read()
            .iter()
            .filter(|(_, node)| predicate(node))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Attaches `node` under `key` and makes this folder its parent.
    ///
    /// Reserved keys are refused with a warning; the return value tells
    /// whether the node was attached.
    pub(crate) fn insert(&self, key: String, node: Node) -> bool {
        if is_reserved_key(&key) {
            warn!(
                "Dropping {}: key '{}' collides with a reserved metadata name",
                node.path().best_effort_path_display(),
                key
            );
            return false;
        }
        node.set_parent(self.downgrade());
        self.inner.children.write().insert(key, node);
        true
    }

    pub fn remove(&self, key: &str) -> Option<Node> {
        self.inner.children.write().remove(key)
    }

    /// Drops every child whose path is `path`, whatever key it sits under.
    pub(crate) fn detach(&self, path: &Path) {
        self.inner
            .children
            .write()
            .retain(|_, node| node.path() != path);
    }

    /// Drops all children from the mirror. Nothing is touched on disk.
    pub fn clear(&self) {
        self.inner.children.write().clear();
    }

    /// Moves every child of `staging` into this folder, replacing the current
    /// children in one step.
    pub(crate) fn replace_children(&self, staging: &Folder) {
        let children = std::mem::take(&mut *staging.inner.children.write());
        for node in children.values() {
            node.set_parent(self.downgrade());
        }
        *self.inner.children.write() = children;
    }

    /// Children surviving `options`, keyed as they are attached.
    pub fn filter(&self, options: &FilterOptions) -> HashMap<String, Node> {
        Filter::new(options).apply(self.inner.children.read().clone())
    }

    /// Children surviving `options`, ordered by key.
    pub fn filter_nodes(&self, options: &FilterOptions) -> Vec<Node> {
        Filter::new(options).nodes(self.inner.children.read().clone())
    }

    /// Keys of children surviving `options`, sorted.
    pub fn filter_keys(&self, options: &FilterOptions) -> Vec<String> {
        Filter::new(options).keys(self.inner.children.read().clone())
    }

    /// Writes a new file into this directory and attaches it under its name.
    pub async fn add_file(&self, name: &str, content: impl Into<Vec<u8>>) -> Result<File, NodeError> {
        let path = self.child_path(name)?;
        let content: Vec<u8> = content.into();
        fs::write(&path, content)
            .await
            .0
            .context(WriteSnafu { path: path.clone() })?;

        let file = File::new(path, EntryType::File, self.downgrade());
        self.insert(name.to_string(), file.clone().into());
        debug!("Added file {}", file.path().best_effort_path_display());
        Ok(file)
    }

    /// Creates a directory (and any missing ancestors) and attaches it under its name.
    pub async fn add_folder(&self, name: &str) -> Result<Folder, NodeError> {
        let path = self.child_path(name)?;
        fs::create_dir_all(&path)
            .await
            .context(CreateDirSnafu { path: path.clone() })?;

        let folder = Folder::new(path, self.downgrade());
        self.insert(name.to_string(), folder.clone().into());
        debug!("Added folder {}", folder.path().best_effort_path_display());
        Ok(folder)
    }

    /// Removes the directory recursively from disk and detaches it from its parent.
    pub async fn delete(&self) -> Result<(), NodeError> {
        let path = self.path().to_path_buf();
        let target = path.clone();
        run_blocking(move || std::fs::remove_dir_all(&target))
            .await
            .context(DeleteSnafu { path: path.clone() })?;

        self.clear();
        if let Some(parent) = self.parent() {
            parent.detach(&path);
        }
        debug!("Deleted folder {}", path.best_effort_path_display());
        Ok(())
    }

    fn child_path(&self, name: &str) -> Result<PathBuf, NodeError> {
        ensure!(!is_reserved_key(name), ReservedNameSnafu { name });
        let is_plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
        ensure!(is_plain, InvalidNameSnafu { name });
        Ok(self.path().join(name))
    }
}
