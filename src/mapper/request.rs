use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu};

use crate::ext::absolutize;
use crate::filter::{FilterOptions, KeyStyle, NamePattern};
use crate::mapper::MapOptions;
use crate::node::EntryType;

/// A mapping request as callers write it.
///
/// `types` accepts entry type names (`file`, `directory`, `unknown`); any
/// other value is taken as an extension. A basename containing `*` or `?`
/// maps the matching children of its directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapRequest {
    pub path: Option<String>,
    /// Key of the result in a batch; defaults to the base name of the root.
    pub name: Option<String>,
    pub recursive: bool,
    pub types: Vec<String>,
    pub extensions: Vec<String>,
    pub name_match: Option<String>,
    pub path_match: Option<String>,
    pub key_style: KeyStyle,
    pub dot_start: bool,
    /// Structural levels before flattening. Implies `recursive`.
    pub simple: Option<usize>,
    pub keep_empty_folders: bool,
}

/// A validated request: an absolute root and the options to map it with.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub root: PathBuf,
    pub options: MapOptions,
}

impl MapRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn relative(mut self) -> Self {
        self.key_style = KeyStyle::Relative;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn resolve(&self) -> Result<ResolvedRequest, RequestError> {
        let raw = self
            .path
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .context(MissingPathSnafu)?;
        let (dir, wildcard) = split_wildcard(raw);

        let mut kinds = Vec::new();
        let mut extensions = Vec::new();
        for value in &self.types {
            match EntryType::parse(value) {
                Some(kind) => kinds.push(kind),
                None => extensions.push(trim_dot(value)),
            }
        }
        extensions.extend(self.extensions.iter().map(|ext| trim_dot(ext)));

        let name_match = match (wildcard, self.name_match.as_deref()) {
            (Some(_), Some(_)) => return ConflictingPatternsSnafu { path: raw }.fail(),
            (Some(glob), None) => Some(
                NamePattern::glob(glob).context(InvalidWildcardSnafu { pattern: glob })?,
            ),
            (None, Some(pattern)) => Some(
                NamePattern::regex(pattern).context(InvalidPatternSnafu { pattern })?,
            ),
            (None, None) => None,
        };
        let path_match = self
            .path_match
            .as_deref()
            .map(|pattern| NamePattern::regex(pattern).context(InvalidPatternSnafu { pattern }))
            .transpose()?;

        let filter = FilterOptions {
            kinds: (!kinds.is_empty()).then_some(kinds),
            extensions: (!extensions.is_empty()).then_some(extensions),
            name_match,
            path_match,
            dot_start: self.dot_start,
            recursive: self.recursive || self.simple.is_some(),
        };

        Ok(ResolvedRequest {
            root: absolutize(Path::new(dir)),
            options: MapOptions {
                filter,
                key_style: self.key_style.clone(),
                levels: self.simple,
                keep_empty_folders: self.keep_empty_folders,
            },
        })
    }
}

impl From<&str> for MapRequest {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for MapRequest {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for MapRequest {
    fn from(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }
}

impl From<PathBuf> for MapRequest {
    fn from(path: PathBuf) -> Self {
        Self::from(path.as_path())
    }
}

fn trim_dot(ext: &str) -> String {
    ext.trim_start_matches('.').to_string()
}

/// Splits `dir/pat*` into `("dir", Some("pat*"))`.
fn split_wildcard(raw: &str) -> (&str, Option<&str>) {
    let split_at = raw.rfind(['/', '\\', MAIN_SEPARATOR]);
    let basename = match split_at {
        Some(index) => &raw[index + 1..],
        None => raw,
    };
    if !basename.contains(['*', '?']) {
        return (raw, None);
    }

    let dir = match split_at {
        Some(0) => &raw[..1],
        Some(index) => &raw[..index],
        None => ".",
    };
    (dir, Some(basename))
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RequestError {
    #[snafu(display("Mapping request has no path"))]
    MissingPathError,
    #[snafu(display("Invalid pattern '{}'", pattern))]
    InvalidPatternError {
        pattern: String,
        source: regex::Error,
    },
    #[snafu(display("Invalid wildcard '{}'", pattern))]
    InvalidWildcardError {
        pattern: String,
        source: glob::PatternError,
    },
    #[snafu(display("'{}' has a wildcard and an explicit match pattern", path))]
    ConflictingPatternsError { path: String },
}
