use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{borrow::Cow, path::Path};
use tracing::{debug, warn};

use fsmirror::{KeyStyle, MapRequest, ext::BestEffortPathExt};

/// Mapping requests loaded from a YAML file.
///
/// ```yaml
/// roots:
///   docs:
///     path: ./docs
///     recursive: true
///     ext: [md]
///   src: ./src
/// ```
///
/// `roots` may also be a list, in which case each entry is keyed by its
/// `name` field or the base name of its path.
#[derive(Debug, Clone, Default)]
pub struct RequestFile {
    pub requests: Vec<MapRequest>,
}

impl RequestFile {
    pub async fn read(path: &Path) -> Result<Self, RequestFileError> {
        debug!("Reading request file: {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read request file: {} bytes", contents.len());
        contents.as_str().try_into()
    }

    fn parse_roots(roots: &Yaml) -> Result<Vec<MapRequest>, RequestFileError> {
        if let Some(items) = roots.as_sequence() {
            return Ok(items
                .iter()
                .filter_map(|item| parse_request(None, item))
                .collect());
        }

        let entries = roots.as_mapping().context(RootsNotCollectionSnafu)?;
        Ok(entries
            .iter()
            .filter_map(|(name, item)| match name.as_str() {
                Some(name) => parse_request(Some(name), item),
                None => {
                    warn!("Skipping root with a non-string name: {:?}", name);
                    None
                }
            })
            .collect())
    }
}

impl TryFrom<&str> for RequestFile {
    type Error = RequestFileError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec.first().context(MalformedConfigSnafu)?;
        let top_level = contents.as_mapping().context(TopLevelNotMapSnafu)?;
        let roots = field(top_level, "roots").context(MissingRootsSnafu)?;

        Ok(RequestFile {
            requests: Self::parse_roots(roots)?,
        })
    }
}

fn field<'a, 'y>(data: &'a LinkedHashMap<Yaml<'y>, Yaml<'y>>, key: &'static str) -> Option<&'a Yaml<'y>> {
    data.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
}

fn string(data: &LinkedHashMap<Yaml, Yaml>, key: &'static str) -> Option<String> {
    field(data, key).and_then(|value| value.as_str()).map(str::to_string)
}

fn flag(data: &LinkedHashMap<Yaml, Yaml>, key: &'static str) -> bool {
    matches!(field(data, key), Some(Yaml::Value(Scalar::Boolean(true))))
}

/// A single string or a list of strings.
fn string_list(data: &LinkedHashMap<Yaml, Yaml>, key: &'static str) -> Vec<String> {
    let Some(value) = field(data, key) else {
        return Vec::new();
    };
    if let Some(single) = value.as_str() {
        return vec![single.to_string()];
    }
    value
        .as_sequence()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_request(name: Option<&str>, item: &Yaml) -> Option<MapRequest> {
    if let Some(path) = item.as_str() {
        let mut request = MapRequest::new(path);
        request.name = name.map(str::to_string);
        return Some(request);
    }

    let Some(data) = item.as_mapping() else {
        warn!("Skipping invalid root entry: {:?}", item);
        return None;
    };

    let key_style = match (flag(data, "relative"), string(data, "prefix")) {
        (true, _) => KeyStyle::Relative,
        (false, Some(prefix)) => KeyStyle::Prefix(prefix),
        (false, None) => KeyStyle::Absolute,
    };
    let simple = match field(data, "simple") {
        Some(Yaml::Value(Scalar::Integer(levels))) => usize::try_from(*levels).ok(),
        _ => None,
    };

    Some(MapRequest {
        path: string(data, "path"),
        name: string(data, "name").or_else(|| name.map(str::to_string)),
        recursive: flag(data, "recursive"),
        types: string_list(data, "type"),
        extensions: string_list(data, "ext"),
        name_match: string(data, "match"),
        path_match: string(data, "pathMatch"),
        key_style,
        dot_start: flag(data, "dotStart"),
        simple,
        keep_empty_folders: flag(data, "keepEmpty"),
    })
}

#[derive(Debug, Snafu)]
pub enum RequestFileError {
    #[snafu(display("Failed to read the request file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Request file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the request file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted request file"))]
    MalformedConfig,
    #[snafu(display("Top level of the request file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Request file has no 'roots' section"))]
    MissingRoots,
    #[snafu(display("'roots' should be a list or a map"))]
    RootsNotCollection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<RequestFile, RequestFileError> {
        contents.try_into()
    }

    #[compio::test]
    async fn request_file_returns_error_on_nonexistent_file() {
        let result = RequestFile::read(Path::new("nonexistent.yaml")).await;
        assert!(matches!(result, Err(RequestFileError::ReadError { .. })));
    }

    #[compio::test]
    async fn request_file_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("roots.yaml");
        std::fs::write(&path, "roots:\n  - ./src\n").unwrap();

        let file = RequestFile::read(&path).await.unwrap();
        assert_eq!(file.requests, vec![MapRequest::new("./src")]);
    }

    #[test]
    fn request_file_returns_error_on_invalid_yaml() {
        assert!(matches!(
            parse("invalid: yaml: content: [unclosed"),
            Err(RequestFileError::ParseError { .. })
        ));
    }

    #[test]
    fn request_file_returns_error_on_empty_file() {
        assert!(matches!(parse(""), Err(RequestFileError::MalformedConfig)));
    }

    #[test]
    fn request_file_returns_error_when_top_level_is_not_map() {
        assert!(matches!(
            parse("- item1\n- item2"),
            Err(RequestFileError::TopLevelNotMap)
        ));
        assert!(matches!(
            parse("just a string"),
            Err(RequestFileError::TopLevelNotMap)
        ));
    }

    #[test]
    fn request_file_requires_roots() {
        assert!(matches!(
            parse("other: value"),
            Err(RequestFileError::MissingRoots)
        ));
        assert!(matches!(
            parse("roots: 3"),
            Err(RequestFileError::RootsNotCollection)
        ));
    }

    #[test]
    fn request_file_parses_a_list_of_roots() {
        let file = parse(
            r#"
roots:
  - ./plain
  - path: ./docs
    name: manual
    recursive: true
    type: [file, md]
    ext: .txt
    match: "^a"
    pathMatch: "docs"
    relative: true
    dotStart: true
    simple: 2
    keepEmpty: true
"#,
        )
        .unwrap();

        assert_eq!(file.requests.len(), 2);
        assert_eq!(file.requests[0], MapRequest::new("./plain"));
        assert_eq!(
            file.requests[1],
            MapRequest {
                path: Some("./docs".into()),
                name: Some("manual".into()),
                recursive: true,
                types: vec!["file".into(), "md".into()],
                extensions: vec![".txt".into()],
                name_match: Some("^a".into()),
                path_match: Some("docs".into()),
                key_style: KeyStyle::Relative,
                dot_start: true,
                simple: Some(2),
                keep_empty_folders: true,
            }
        );
    }

    #[test]
    fn request_file_names_mapped_roots_by_key() {
        let file = parse(
            r#"
roots:
  src: ./src
  docs:
    path: ./docs
    prefix: /home/
"#,
        )
        .unwrap();

        assert_eq!(file.requests[0], MapRequest::new("./src").named("src"));
        assert_eq!(file.requests[1].name.as_deref(), Some("docs"));
        assert_eq!(
            file.requests[1].key_style,
            KeyStyle::Prefix("/home/".into())
        );
    }

    #[test]
    fn request_file_keeps_roots_without_path_for_later_validation() {
        let file = parse("roots:\n  - recursive: true\n").unwrap();
        assert_eq!(file.requests.len(), 1);
        assert!(file.requests[0].resolve().is_err());
    }

    #[test]
    fn request_file_skips_invalid_entries() {
        let file = parse(
            r#"
roots:
  - 123
  - [nested, list]
  - ./kept
"#,
        )
        .unwrap();
        assert_eq!(file.requests, vec![MapRequest::new("./kept")]);
    }
}
