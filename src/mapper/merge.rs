use std::collections::HashMap;

use crate::node::{Folder, Node};

/// Combines two mirrors.
///
/// When both are folders, `b` is merged into `a` and `a` is returned, so
/// handles to `a` observe the union. Otherwise `b` wins.
pub fn merge(a: &Node, b: &Node) -> Node {
    match (a, b) {
        (Node::Folder(into), Node::Folder(from)) => {
            merge_folders(into, from);
            a.clone()
        }
        _ => b.clone(),
    }
}

/// Moves every child of `from` into `into`. Folders present on both sides
/// are merged recursively; any other collision is won by `from`.
pub fn merge_folders(into: &Folder, from: &Folder) {
    if into.ptr_eq(from) {
        return;
    }

    for (key, node) in from.children() {
        match (into.get(&key), &node) {
            (Some(Node::Folder(existing)), Node::Folder(incoming)) => {
                merge_folders(&existing, incoming);
            }
            _ => {
                into.insert(key, node);
            }
        }
    }
}

/// Adds `node` under `key`, merging with a folder already stored there.
pub(crate) fn merge_entry(tree: &mut HashMap<String, Node>, key: String, node: Node) {
    let merged = match tree.get(&key) {
        Some(existing) => merge(existing, &node),
        None => node,
    };
    tree.insert(key, merged);
}
