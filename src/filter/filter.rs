use std::collections::HashMap;

use crate::filter::FilterOptions;
use crate::node::{EntryType, Node};

pub struct Filter<'a> {
    options: &'a FilterOptions,
}

impl<'a> Filter<'a> {
    pub fn new(options: &'a FilterOptions) -> Self {
        Self { options }
    }

    pub fn accepts(&self, node: &Node) -> bool {
        let options = self.options;

        if !options.dot_start && node.name().starts_with('.') {
            return false;
        }
        if options.recursive && node.kind() == EntryType::Directory {
            return true;
        }

        self.matches_rules(node)
    }

    /// The type, extension, name and path rules alone, without the dotfile
    /// rule or the recursive override.
    pub fn matches_rules(&self, node: &Node) -> bool {
        let options = self.options;

        if let Some(kinds) = &options.kinds {
            if !kinds.contains(&node.kind()) {
                return false;
            }
        }
        if let Some(extensions) = &options.extensions {
            let extension = node.extension();
            if node.is_folder() || !extensions.iter().any(|ext| ext == extension) {
                return false;
            }
        }
        if let Some(pattern) = &options.name_match {
            if !pattern.is_match(node.name()) {
                return false;
            }
        }
        if let Some(pattern) = &options.path_match {
            if !pattern.is_match(&node.path().to_string_lossy()) {
                return false;
            }
        }

        true
    }

    /// Surviving entries, keys preserved.
    pub fn apply(&self, entries: impl IntoIterator<Item = (String, Node)>) -> HashMap<String, Node> {
        if self.is_identity() {
            return entries.into_iter().collect();
        }
        entries
            .into_iter()
            .filter(|(_, node)| self.accepts(node))
            .collect()
    }

    /// Surviving entries ordered by key.
    pub fn nodes(&self, entries: impl IntoIterator<Item = (String, Node)>) -> Vec<Node> {
        self.sorted(entries).into_iter().map(|(_, node)| node).collect()
    }

    /// Keys of the surviving entries, sorted.
    pub fn keys(&self, entries: impl IntoIterator<Item = (String, Node)>) -> Vec<String> {
        self.sorted(entries).into_iter().map(|(key, _)| key).collect()
    }

    fn sorted(&self, entries: impl IntoIterator<Item = (String, Node)>) -> Vec<(String, Node)> {
        let mut survivors: Vec<(String, Node)> = self.apply(entries).into_iter().collect();
        survivors.sort_by(|a, b| a.0.cmp(&b.0));
        survivors
    }

    fn is_identity(&self) -> bool {
        self.options.dot_start && !self.options.has_content_filter()
    }
}
