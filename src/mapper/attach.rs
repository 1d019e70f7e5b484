use crate::filter::{Filter, FilterOptions, KeyStyle};
use crate::node::{EntryType, Folder, Node};

/// When surviving entries are attached to their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Every survivor is attached immediately.
    Immediate,
    /// Files are attached immediately; folders are attached by
    /// [`attach_descended`] once their own traversal has finished.
    AfterDescent,
    /// Every survivor is attached to the owner regardless of depth. Folders
    /// are always descended but attached only when the filter explicitly
    /// selects directories.
    Flatten,
}

/// Filters `candidates` as one batch, attaches the survivors to `owner` and
/// returns the folders that need a deeper pass.
pub(crate) fn attach(
    owner: &Folder,
    candidates: Vec<Node>,
    filter: &FilterOptions,
    key_style: &KeyStyle,
    placement: Placement,
) -> Vec<Folder> {
    let survivors = Filter::new(filter).apply(
        candidates
            .into_iter()
            .map(|node| (key_style.key_for(owner.path(), node.path()), node)),
    );

    let flat_folders = placement == Placement::Flatten && lists_directories(filter);
    let mut descend = Vec::new();
    for (key, node) in survivors {
        match node {
            Node::Folder(folder) => {
                let node: Node = folder.clone().into();
                if placement == Placement::Immediate
                    || (flat_folders && Filter::new(filter).matches_rules(&node))
                {
                    owner.insert(key, node);
                }
                descend.push(folder);
            }
            file @ Node::File(_) => {
                owner.insert(key, file);
            }
        }
    }

    descend
}

/// A flat view only shows folders when asked for them by type.
fn lists_directories(filter: &FilterOptions) -> bool {
    filter
        .kinds
        .as_ref()
        .is_some_and(|kinds| kinds.contains(&EntryType::Directory))
}

/// Attaches a folder whose traversal has completed.
///
/// Under file-selecting filters a folder only reached through the recursive
/// override is dropped when nothing inside it survived, unless `keep_empty`
/// is set. Returns whether the folder was attached.
pub(crate) fn attach_descended(
    owner: &Folder,
    folder: Folder,
    filter: &FilterOptions,
    key_style: &KeyStyle,
    keep_empty: bool,
) -> bool {
    let node: Node = folder.into();
    let wanted = keep_empty
        || node.as_folder().is_some_and(|folder| !folder.is_empty())
        || (filter.selects_directories() && Filter::new(filter).matches_rules(&node));
    if !wanted {
        return false;
    }

    let key = key_style.key_for(owner.path(), node.path());
    owner.insert(key, node)
}
