use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree of keys
    #[default]
    Tree,
    /// YAML document with node metadata under reserved keys
    Yaml,
}
