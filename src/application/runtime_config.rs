use std::path::PathBuf;

use fsmirror::{KeyStyle, MapRequest};

use crate::application::data::OutputFormat;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub requests: Vec<MapRequest>,
    pub roots_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub watch: bool,
    pub persistent: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let key_style = match (cli.relative, cli.strip_prefix) {
            (true, _) => KeyStyle::Relative,
            (false, Some(prefix)) => KeyStyle::Prefix(prefix),
            (false, None) => KeyStyle::Absolute,
        };
        let template = MapRequest {
            path: None,
            name: None,
            recursive: cli.recursive,
            types: cli.types,
            extensions: cli.extensions,
            name_match: cli.name_match,
            path_match: cli.path_match,
            key_style,
            dot_start: cli.dot_start,
            simple: cli.levels,
            keep_empty_folders: cli.keep_empty,
        };

        Self {
            requests: cli
                .paths
                .into_iter()
                .map(|path| MapRequest {
                    path: Some(path),
                    ..template.clone()
                })
                .collect(),
            roots_file: cli.roots_file,
            format: cli.format,
            watch: cli.watch,
            persistent: cli.persistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn cli_flags_apply_to_every_path() {
        let cli = Cli::parse_from([
            "fsmirror", "-r", "--relative", "-e", "js", "--type", "file", "a", "b",
        ]);
        let config: RuntimeConfig = cli.into();

        assert_eq!(config.requests.len(), 2);
        for (request, path) in config.requests.iter().zip(["a", "b"]) {
            assert_eq!(request.path.as_deref(), Some(path));
            assert!(request.recursive);
            assert_eq!(request.key_style, KeyStyle::Relative);
            assert_eq!(request.extensions, vec!["js"]);
            assert_eq!(request.types, vec!["file"]);
        }
    }

    #[test]
    fn strip_prefix_sets_prefix_keys() {
        let cli = Cli::parse_from(["fsmirror", "--strip-prefix", "/home/", "--levels", "1", "x"]);
        let config: RuntimeConfig = cli.into();

        assert_eq!(config.requests[0].key_style, KeyStyle::Prefix("/home/".into()));
        assert_eq!(config.requests[0].simple, Some(1));
        assert_eq!(config.format, OutputFormat::Tree);
    }
}
