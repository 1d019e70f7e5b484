use std::path::Path;

use regex::Regex;

use crate::node::EntryType;

/// A pattern tested against an entry name or path.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Unanchored regular expression; matches if found anywhere.
    Regex(Regex),
    /// Shell-style wildcard; must match the whole value.
    Glob(glob::Pattern),
}

impl NamePattern {
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(NamePattern::Regex)
    }

    pub fn glob(pattern: &str) -> Result<Self, glob::PatternError> {
        glob::Pattern::new(pattern).map(NamePattern::Glob)
    }

    pub fn is_match(&self, value: &str) -> bool {
        match self {
            NamePattern::Regex(regex) => regex.is_match(value),
            NamePattern::Glob(pattern) => pattern.matches(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NamePattern::Regex(regex) => regex.as_str(),
            NamePattern::Glob(pattern) => pattern.as_str(),
        }
    }
}

/// Which entries survive a filter pass.
///
/// Rules run in a fixed order: dotfiles are dropped unless `dot_start` is
/// set, then directories pass unconditionally when `recursive` is set, then
/// `kinds`, `extensions`, `name_match` and `path_match` must all hold.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub kinds: Option<Vec<EntryType>>,
    /// Extensions without the leading dot. Only files can match.
    pub extensions: Option<Vec<String>>,
    pub name_match: Option<NamePattern>,
    pub path_match: Option<NamePattern>,
    pub dot_start: bool,
    pub recursive: bool,
}

impl FilterOptions {
    /// True when any rule beyond the dotfile rule is active.
    pub fn has_content_filter(&self) -> bool {
        self.kinds.is_some()
            || self.extensions.is_some()
            || self.name_match.is_some()
            || self.path_match.is_some()
    }

    /// Whether directories are wanted in the output for their own sake,
    /// rather than only as a way to reach matching files.
    pub fn selects_directories(&self) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&EntryType::Directory),
            None => self.extensions.is_none(),
        }
    }

    /// A copy with the type and extension rules replaced.
    pub fn with_type_rules(
        &self,
        kinds: Option<Vec<EntryType>>,
        extensions: Option<Vec<String>>,
    ) -> Self {
        Self {
            kinds,
            extensions,
            ..self.clone()
        }
    }
}

/// How the key of an attached entry is derived from its path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// The entry's absolute path.
    #[default]
    Absolute,
    /// The entry's path relative to the folder it is attached to.
    Relative,
    /// The entry's path with a caller-supplied prefix stripped. Paths that do
    /// not start with the prefix keep their absolute form.
    Prefix(String),
}

impl KeyStyle {
    pub fn key_for(&self, owner: &Path, path: &Path) -> String {
        match self {
            KeyStyle::Absolute => path.to_string_lossy().into_owned(),
            KeyStyle::Relative => match path.strip_prefix(owner) {
                Ok(relative) => relative.to_string_lossy().into_owned(),
                Err(_) => path.to_string_lossy().into_owned(),
            },
            KeyStyle::Prefix(prefix) => {
                let full = path.to_string_lossy();
                match full.strip_prefix(prefix.as_str()) {
                    Some(stripped) => stripped.to_string(),
                    None => full.into_owned(),
                }
            }
        }
    }
}
