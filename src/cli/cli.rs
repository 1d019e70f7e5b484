use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{LogLevel, OutputFormat};

/// Mirror directory trees in memory and print them.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Paths to map. A base name containing `*` or `?` maps the matching
    /// children of its directory.
    pub paths: Vec<String>,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Descend into sub-directories
    #[clap(long, short)]
    pub recursive: bool,
    /// Entry types to keep (file, directory, unknown); other values are
    /// taken as extensions
    #[clap(long = "type", short = 't')]
    pub types: Vec<String>,
    /// File extensions to keep
    #[clap(long = "ext", short = 'e')]
    pub extensions: Vec<String>,
    /// Regular expression entry names must match
    #[clap(long = "match", short = 'm')]
    pub name_match: Option<String>,
    /// Regular expression entry paths must match
    #[clap(long)]
    pub path_match: Option<String>,
    /// Key entries by their path relative to the containing folder
    #[clap(long, conflicts_with = "strip_prefix")]
    pub relative: bool,
    /// Key entries by their path with this prefix removed
    #[clap(long)]
    pub strip_prefix: Option<String>,
    /// Include entries whose name starts with a dot
    #[clap(long)]
    pub dot_start: bool,
    /// Keep this many levels of structure and flatten everything below
    #[clap(long)]
    pub levels: Option<usize>,
    /// Keep folders in which nothing matched
    #[clap(long)]
    pub keep_empty: bool,

    /// YAML file with additional roots to map
    #[clap(long, short = 'F')]
    pub roots_file: Option<PathBuf>,
    #[clap(long, short, default_value = "tree", value_enum)]
    pub format: OutputFormat,
    /// Remap and print again when the root changes
    #[clap(long, short)]
    pub watch: bool,
    /// Keep watching after the first change
    #[clap(long, requires = "watch")]
    pub persistent: bool,
}
