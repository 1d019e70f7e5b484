use std::{borrow::Cow, collections::HashMap};

use colored::Colorize;
use hashlink::LinkedHashMap;
use saphyr::{Scalar, Yaml, YamlEmitter};
use snafu::prelude::*;

use fsmirror::{EntryType, Node};

use crate::application::data::OutputFormat;

/// Enables colored output only when stdout can show it.
pub fn configure_color() {
    let supported = supports_color::on(supports_color::Stream::Stdout).is_some();
    colored::control::set_override(supported);
}

pub fn render(node: &Node, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Tree => Ok(render_tree(node)),
        OutputFormat::Yaml => emit(&node_to_yaml(node)),
    }
}

/// Renders a batch result, one top-level entry per key.
pub fn render_batch(tree: &HashMap<String, Node>, format: OutputFormat) -> Result<String, RenderError> {
    let mut keys: Vec<&String> = tree.keys().collect();
    keys.sort();

    match format {
        OutputFormat::Tree => {
            let mut out = String::new();
            for key in keys {
                let node = &tree[key];
                out.push_str(&label(key, node));
                out.push('\n');
                write_children(node, "", &mut out);
            }
            Ok(out)
        }
        OutputFormat::Yaml => {
            let mut mapping = LinkedHashMap::new();
            for key in keys {
                mapping.insert(string(key.as_str()), node_to_yaml(&tree[key]));
            }
            emit(&Yaml::Mapping(mapping))
        }
    }
}

fn render_tree(node: &Node) -> String {
    let mut out = label(&node.path().display().to_string(), node);
    out.push('\n');
    write_children(node, "", &mut out);
    out
}

fn write_children(node: &Node, indent: &str, out: &mut String) {
    let Node::Folder(folder) = node else {
        return;
    };
    let children = folder.children();
    for (index, (key, child)) in children.iter().enumerate() {
        let (branch, continuation) = if index + 1 == children.len() {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        out.push_str(indent);
        out.push_str(branch);
        out.push_str(&label(key, child));
        out.push('\n');
        write_children(child, &format!("{indent}{continuation}"), out);
    }
}

fn label(key: &str, node: &Node) -> String {
    match node.kind() {
        EntryType::Directory => format!("{key}/").blue().bold().to_string(),
        EntryType::Unknown => key.yellow().to_string(),
        EntryType::File => key.to_string(),
    }
}

/// Children sit next to the node's metadata; reserved keys cannot collide
/// with child keys.
fn node_to_yaml(node: &Node) -> Yaml<'static> {
    let mut mapping = LinkedHashMap::new();
    mapping.insert(string("_type"), string(node.kind().to_string()));
    mapping.insert(string("_name"), string(node.name()));
    mapping.insert(string("_path"), string(node.path().to_string_lossy()));

    match node {
        Node::File(file) => {
            mapping.insert(string("_ext"), string(file.extension()));
        }
        Node::Folder(folder) => {
            for (key, child) in folder.children() {
                mapping.insert(string(key), node_to_yaml(&child));
            }
        }
    }
    Yaml::Mapping(mapping)
}

fn string(value: impl Into<String>) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Owned(value.into())))
}

fn emit(document: &Yaml) -> Result<String, RenderError> {
    let mut out = String::new();
    YamlEmitter::new(&mut out).dump(document).context(EmitSnafu)?;
    out.push('\n');
    Ok(out)
}

#[derive(Debug, Snafu)]
pub enum RenderError {
    #[snafu(display("Failed to emit YAML output"))]
    EmitError { source: saphyr::EmitError },
}
