use std::path::PathBuf;

use futures::future::{LocalBoxFuture, try_join_all};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::filter::{FilterOptions, KeyStyle};
use crate::mapper::attach::{Placement, attach, attach_descended};
use crate::mapper::mapper::{CancelledSnafu, ListSnafu};
use crate::mapper::source::materialize;
use crate::mapper::{CancellationToken, EntrySource, MapError};
use crate::node::Folder;

/// How descended folders relate to the folder that owns a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// Each directory becomes a folder attached to its parent.
    Nested,
    /// Every file below the owner is attached directly to the owner.
    Flat,
}

/// One traversal invocation: the option set, the layout and the token
/// shared by all of its fanned-out work.
pub(crate) struct Traversal<'a, S> {
    source: &'a S,
    filter: &'a FilterOptions,
    key_style: &'a KeyStyle,
    keep_empty: bool,
    layout: Layout,
    token: CancellationToken,
}

impl<'a, S: EntrySource> Traversal<'a, S> {
    pub(crate) fn new(
        source: &'a S,
        filter: &'a FilterOptions,
        key_style: &'a KeyStyle,
        layout: Layout,
        token: CancellationToken,
    ) -> Self {
        Self {
            source,
            filter,
            key_style,
            keep_empty: false,
            layout,
            token,
        }
    }

    pub(crate) fn keep_empty(mut self, keep_empty: bool) -> Self {
        self.keep_empty = keep_empty;
        self
    }

    /// Maps the directory at `dir` into `owner`, descending when the filter
    /// asks for recursion.
    ///
    /// Resolves only after every spawned child traversal has finished, or
    /// with the first error; the remaining children are dropped at that point
    /// and their I/O is abandoned.
    pub(crate) fn run(&self, owner: Folder, dir: PathBuf) -> LocalBoxFuture<'_, Result<(), MapError>> {
        async move {
            let placement = match (self.layout, self.filter.recursive) {
                (Layout::Flat, _) => Placement::Flatten,
                (Layout::Nested, true) => Placement::AfterDescent,
                (Layout::Nested, false) => Placement::Immediate,
            };
            let descend = self.expand(&owner, dir, placement).await?;
            if !self.filter.recursive || descend.is_empty() {
                return Ok(());
            }

            match self.layout {
                Layout::Nested => self.descend_nested(&owner, descend).await,
                Layout::Flat => self.descend_flat(&owner, descend).await,
            }
        }
        .boxed_local()
    }

    /// Lists `dir`, materializes every entry concurrently and attaches the
    /// batch to `owner`. Returns the folders that still need a pass.
    pub(crate) async fn expand(
        &self,
        owner: &Folder,
        dir: PathBuf,
        placement: Placement,
    ) -> Result<Vec<Folder>, MapError> {
        ensure!(!self.token.is_cancelled(), CancelledSnafu);
        debug!("Listing {}", dir.best_effort_path_display());
        let names = self
            .source
            .list(&dir)
            .await
            .context(ListSnafu { path: dir.clone() })
            .inspect_err(|_| self.token.cancel())?;

        ensure!(!self.token.is_cancelled(), CancelledSnafu);
        let children = try_join_all(
            names
                .into_iter()
                .map(|name| materialize(self.source, dir.join(name), owner)),
        )
        .await
        .inspect_err(|_| self.token.cancel())?;

        debug!(
            "Materialized {} entries in {}",
            children.len(),
            dir.best_effort_path_display()
        );
        Ok(attach(owner, children, self.filter, self.key_style, placement))
    }

    async fn descend_nested(&self, owner: &Folder, folders: Vec<Folder>) -> Result<(), MapError> {
        let mut pending: FuturesUnordered<_> = folders
            .into_iter()
            .map(|folder| async move {
                let dir = folder.path().to_path_buf();
                self.run(folder.clone(), dir).await.map(|()| folder)
            })
            .collect();

        while let Some(result) = pending.next().await {
            let folder = result.inspect_err(|_| self.token.cancel())?;
            attach_descended(owner, folder, self.filter, self.key_style, self.keep_empty);
        }

        Ok(())
    }

    async fn descend_flat(&self, owner: &Folder, folders: Vec<Folder>) -> Result<(), MapError> {
        try_join_all(
            folders
                .into_iter()
                .map(|folder| self.run(owner.clone(), folder.path().to_path_buf())),
        )
        .await
        .inspect_err(|_| self.token.cancel())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use super::*;
    use crate::filter::NamePattern;
    use crate::mapper::CompioSource;
    use crate::node::EntryType;
    use crate::test_support::{FaultySource, TreeFixture, sample_tree};

    async fn traverse(root: &Path, filter: &FilterOptions, layout: Layout) -> Result<Folder, MapError> {
        let folder = Folder::new_root(root.to_path_buf());
        Traversal::new(
            &CompioSource,
            filter,
            &KeyStyle::Relative,
            layout,
            CancellationToken::new(),
        )
        .run(folder.clone(), root.to_path_buf())
        .await?;
        Ok(folder)
    }

    fn sub_folder(folder: &Folder, key: &str) -> Folder {
        folder
            .get(key)
            .and_then(|node| node.as_folder().cloned())
            .unwrap_or_else(|| panic!("expected folder under '{key}'"))
    }

    #[compio::test]
    async fn recursive_mapping_mirrors_the_tree() {
        let fixture = sample_tree();
        let filter = FilterOptions {
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();

        assert_eq!(root.keys(), vec!["hello.js", "second"]);
        let second = sub_folder(&root, "second");
        assert_eq!(second.keys(), vec!["third", "world.json"]);
        let third = sub_folder(&second, "third");
        assert_eq!(third.keys(), vec!["hello.js"]);
        assert_eq!(
            third.get("hello.js").unwrap().kind(),
            EntryType::File
        );
        assert!(third.parent().unwrap().ptr_eq(&second));
    }

    #[compio::test]
    async fn non_recursive_mapping_leaves_folders_empty() {
        let fixture = sample_tree();
        let root = traverse(fixture.root(), &FilterOptions::default(), Layout::Nested)
            .await
            .unwrap();

        assert_eq!(root.keys(), vec!["hello.js", "second"]);
        assert!(sub_folder(&root, "second").is_empty());
    }

    #[compio::test]
    async fn extension_filter_keeps_only_paths_to_matches() {
        let fixture = sample_tree();
        let filter = FilterOptions {
            extensions: Some(vec!["json".into()]),
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();

        assert_eq!(root.keys(), vec!["second"]);
        assert_eq!(sub_folder(&root, "second").keys(), vec!["world.json"]);
    }

    #[compio::test]
    async fn extension_filter_keeps_intermediate_folders() {
        let fixture = sample_tree();
        let filter = FilterOptions {
            extensions: Some(vec!["js".into()]),
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();

        assert_eq!(root.keys(), vec!["hello.js", "second"]);
        let second = sub_folder(&root, "second");
        assert_eq!(second.keys(), vec!["third"]);
        assert_eq!(sub_folder(&second, "third").keys(), vec!["hello.js"]);
    }

    #[compio::test]
    async fn flat_layout_pulls_files_up_to_the_owner() {
        let fixture = sample_tree();
        let filter = FilterOptions {
            extensions: Some(vec!["js".into()]),
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Flat).await.unwrap();

        assert_eq!(root.keys(), vec!["hello.js", "second/third/hello.js"]);
        for (_, node) in root.children() {
            assert!(node.parent().unwrap().ptr_eq(&root));
        }
    }

    #[compio::test]
    async fn name_match_applies_to_folders_when_not_recursive() {
        let fixture = sample_tree();
        let filter = FilterOptions {
            name_match: Some(NamePattern::glob("sec*").unwrap()),
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();
        assert_eq!(root.keys(), vec!["second"]);
    }

    #[compio::test]
    async fn empty_directory_maps_to_an_empty_folder() {
        let fixture = TreeFixture::new(&[]);
        let filter = FilterOptions {
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();
        assert!(root.is_empty());

        std::fs::create_dir(fixture.path("hollow")).unwrap();
        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();
        assert_eq!(root.keys(), vec!["hollow"]);
        assert!(sub_folder(&root, "hollow").is_empty());
    }

    #[compio::test]
    async fn entries_of_unknown_type_become_files() {
        let fixture = TreeFixture::new(&[("pipe", ""), ("plain.txt", "p")]);
        let source = FaultySource::new().unknown(fixture.path("pipe"));
        let filter = FilterOptions::default();
        let root = Folder::new_root(fixture.root().to_path_buf());

        Traversal::new(
            &source,
            &filter,
            &KeyStyle::Relative,
            Layout::Nested,
            CancellationToken::new(),
        )
        .run(root.clone(), fixture.root().to_path_buf())
        .await
        .unwrap();

        let pipe = root.get("pipe").unwrap();
        assert_eq!(pipe.kind(), EntryType::Unknown);
        assert!(pipe.as_file().is_some());
        assert_eq!(root.get("plain.txt").unwrap().kind(), EntryType::File);
    }

    #[cfg(unix)]
    #[compio::test]
    async fn unix_socket_is_mapped_as_unknown() {
        let fixture = TreeFixture::new(&[]);
        let _listener = std::os::unix::net::UnixListener::bind(fixture.path("sock")).unwrap();

        let root = traverse(fixture.root(), &FilterOptions::default(), Layout::Nested)
            .await
            .unwrap();

        assert_eq!(root.get("sock").unwrap().kind(), EntryType::Unknown);
    }

    #[compio::test]
    async fn type_filter_can_select_unknown_entries() {
        let fixture = TreeFixture::new(&[("pipe", ""), ("plain.txt", "p")]);
        let source = FaultySource::new().unknown(fixture.path("pipe"));
        let filter = FilterOptions {
            kinds: Some(vec![EntryType::Unknown]),
            ..Default::default()
        };
        let root = Folder::new_root(fixture.root().to_path_buf());

        Traversal::new(
            &source,
            &filter,
            &KeyStyle::Relative,
            Layout::Nested,
            CancellationToken::new(),
        )
        .run(root.clone(), fixture.root().to_path_buf())
        .await
        .unwrap();

        assert_eq!(root.keys(), vec!["pipe"]);
    }

    #[compio::test]
    async fn dotfiles_are_skipped_unless_requested() {
        let fixture = TreeFixture::new(&[(".env", "x"), ("visible.txt", "y"), (".cache/blob", "z")]);
        let mut filter = FilterOptions {
            recursive: true,
            ..Default::default()
        };

        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();
        assert_eq!(root.keys(), vec!["visible.txt"]);

        filter.dot_start = true;
        let root = traverse(fixture.root(), &filter, Layout::Nested).await.unwrap();
        assert_eq!(root.keys(), vec![".cache", ".env", "visible.txt"]);
    }

    #[compio::test]
    async fn first_error_wins_and_abandons_pending_siblings() {
        let fixture = sample_tree();
        let source = FaultySource::new()
            .failing(fixture.path("second/world.json"))
            .stuck(fixture.path("second/third"));
        let filter = FilterOptions {
            recursive: true,
            ..Default::default()
        };
        let token = CancellationToken::new();
        let second = Folder::new_root(fixture.path("second"));

        let result = Traversal::new(
            &source,
            &filter,
            &KeyStyle::Relative,
            Layout::Nested,
            token.clone(),
        )
        .run(second.clone(), fixture.path("second"))
        .await;

        match result {
            Err(MapError::StatError { path, .. }) => {
                assert_eq!(path, fixture.path("second/world.json"))
            }
            other => panic!("Expected StatError, got {other:?}"),
        }
        assert!(token.is_cancelled());
        assert!(second.is_empty());
    }

    #[compio::test]
    async fn failing_sibling_does_not_wait_for_stuck_entries() {
        let fixture = TreeFixture::new(&[("a.txt", "a"), ("b.txt", "b")]);
        let source = FaultySource::new()
            .failing(fixture.path("a.txt"))
            .stuck(fixture.path("b.txt"));
        let filter = FilterOptions::default();
        let root = Folder::new_root(fixture.root().to_path_buf());

        let result = Traversal::new(
            &source,
            &filter,
            &KeyStyle::Relative,
            Layout::Nested,
            CancellationToken::new(),
        )
        .run(root.clone(), fixture.root().to_path_buf())
        .await;

        assert!(matches!(result, Err(MapError::StatError { .. })));
        assert!(root.is_empty());
    }

    #[compio::test]
    async fn list_failure_leaves_completed_siblings_attached() {
        let fixture = TreeFixture::new(&[("good/a.txt", "a"), ("bad/b.txt", "b")]);
        let source = FaultySource::new().unlistable(fixture.path("bad"));
        let filter = FilterOptions {
            recursive: true,
            ..Default::default()
        };
        let root = Folder::new_root(fixture.root().to_path_buf());

        let result = Traversal::new(
            &source,
            &filter,
            &KeyStyle::Relative,
            Layout::Nested,
            CancellationToken::new(),
        )
        .run(root.clone(), fixture.root().to_path_buf())
        .await;

        match result {
            Err(MapError::ListError { path, .. }) => assert_eq!(path, fixture.path("bad")),
            other => panic!("Expected ListError, got {other:?}"),
        }
        assert!(!root.contains_key("bad"));
        let keys: HashSet<String> = root.keys().into_iter().collect();
        assert!(keys.is_subset(&HashSet::from(["good".to_string()])));
    }

    #[compio::test]
    async fn cancelled_token_stops_before_listing() {
        let fixture = sample_tree();
        let token = CancellationToken::new();
        token.cancel();
        let filter = FilterOptions::default();
        let root = Folder::new_root(fixture.root().to_path_buf());

        let result = Traversal::new(&CompioSource, &filter, &KeyStyle::Relative, Layout::Nested, token)
            .run(root.clone(), fixture.root().to_path_buf())
            .await;

        assert!(matches!(result, Err(MapError::Cancelled)));
        assert!(root.is_empty());
    }
}
