use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

pub fn best_effort_path_display(path: &Path) -> String {
    match path.canonicalize() {
        Ok(canonical_path) => canonical_path.display().to_string(),
        Err(_) => absolutize(path).display().to_string(),
    }
}

/// Makes `path` absolute against the current directory and removes `.` and
/// `..` components without touching the filesystem.
pub fn absolutize(path: &Path) -> PathBuf {
    let path = normalize_separators(path);
    let absolute_path = if path.is_absolute() {
        path
    } else {
        match std::env::current_dir() {
            Ok(current_dir) => current_dir.join(path),
            Err(_) => path,
        }
    };

    normalize_path(&absolute_path)
}

pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root
                if !components.is_empty() && !matches!(components.last(), Some(Component::RootDir))
                {
                    components.pop();
                }
            }
            _ => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

fn normalize_separators(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let foreign = if MAIN_SEPARATOR == '/' { '\\' } else { '/' };
    if raw.contains(foreign) {
        PathBuf::from(raw.replace(foreign, &MAIN_SEPARATOR.to_string()))
    } else {
        path.to_path_buf()
    }
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

impl BestEffortPathExt for PathBuf {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self)
    }
}

impl BestEffortPathExt for &str {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(Path::new(self))
    }
}

impl BestEffortPathExt for String {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(Path::new(self))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/a/b/../c", "/a/c")]
    #[case("/a/./b/", "/a/b")]
    #[case("/../a", "/a")]
    #[case("/a/b/c/../../d", "/a/d")]
    fn normalizes_dot_components(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn absolutize_joins_current_dir() {
        let current_dir = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("x/./y")), current_dir.join("x").join("y"));
    }

    #[cfg(unix)]
    #[test]
    fn absolutize_normalizes_foreign_separators() {
        assert_eq!(absolutize(Path::new("/a\\b\\c")), PathBuf::from("/a/b/c"));
    }
}
