use crate::filter::{FilterOptions, KeyStyle};

/// Everything a mapping pass needs besides the root path.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub filter: FilterOptions,
    pub key_style: KeyStyle,
    /// Number of structural levels before everything deeper is flattened
    /// into the folders of the last level. `None` maps the whole tree
    /// structurally.
    pub levels: Option<usize>,
    /// Keep folders that were only descended to look for matches even when
    /// nothing inside them matched.
    pub keep_empty_folders: bool,
}

impl MapOptions {
    pub fn recursive() -> Self {
        Self {
            filter: FilterOptions {
                recursive: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }
}
