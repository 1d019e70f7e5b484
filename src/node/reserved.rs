/// Keys under which node metadata is exposed when a mirror is rendered as a
/// document. A child entry can never be attached under one of these.
pub const RESERVED_KEYS: &[&str] = &["_type", "_ext", "_name", "_path", "_parent", "_content"];

/// Returns true when `key` can not be used as a child key.
pub fn is_reserved_key(key: &str) -> bool {
    key.is_empty() || RESERVED_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("_type", true)]
    #[case("_path", true)]
    #[case("", true)]
    #[case("type", false)]
    #[case("_types", false)]
    #[case("/abs/_type", false)]
    fn recognizes_reserved_keys(#[case] key: &str, #[case] reserved: bool) {
        assert_eq!(is_reserved_key(key), reserved);
    }
}
