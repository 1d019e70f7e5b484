use futures::future::try_join_all;
use tracing::debug;

use crate::filter::FilterOptions;
use crate::mapper::attach::Placement;
use crate::mapper::traversal::{Layout, Traversal};
use crate::mapper::{CancellationToken, EntrySource, MapError, MapOptions};
use crate::node::Folder;

/// Maps `levels` levels below `root` structurally, then gives every folder
/// on the last frontier a flat view of everything beneath it.
///
/// Structural levels ignore the type and extension rules of `options` so
/// that every directory stays reachable; those rules become the terminal
/// filter of the flat pass. With `levels == 0` the root itself is flattened.
pub(crate) async fn map_levels<S: EntrySource>(
    source: &S,
    token: CancellationToken,
    root: &Folder,
    levels: usize,
    options: &MapOptions,
) -> Result<(), MapError> {
    let structural = FilterOptions {
        recursive: true,
        ..options.filter.with_type_rules(None, None)
    };
    let terminal = FilterOptions {
        recursive: true,
        ..options.filter.clone()
    };

    let step = Traversal::new(
        source,
        &structural,
        &options.key_style,
        Layout::Nested,
        token.clone(),
    );
    let mut frontier = vec![root.clone()];
    let mut remaining = levels;

    while remaining > 0 && !frontier.is_empty() {
        remaining -= 1;
        debug!(
            "Expanding frontier of {} folders, {} structural levels left",
            frontier.len(),
            remaining
        );
        let expanded = try_join_all(frontier.iter().map(|folder| {
            step.expand(folder, folder.path().to_path_buf(), Placement::Immediate)
        }))
        .await
        .inspect_err(|_| token.cancel())?;
        frontier = expanded.into_iter().flatten().collect();
    }

    debug!("Flattening below {} frontier folders", frontier.len());
    let flatten = Traversal::new(source, &terminal, &options.key_style, Layout::Flat, token.clone());
    try_join_all(
        frontier
            .iter()
            .map(|folder| flatten.run(folder.clone(), folder.path().to_path_buf())),
    )
    .await
    .inspect_err(|_| token.cancel())?;

    Ok(())
}
