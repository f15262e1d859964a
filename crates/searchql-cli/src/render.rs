//! Output formats for parsed IR

use std::fmt::Write;

use clap::ValueEnum;
use searchql::{Node, NodeRef, to_dot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Canonical one-line form
    #[default]
    Dump,
    /// Serialized IR tree
    Json,
    /// Graphviz digraph
    Dot,
    /// Indented node names with content
    Tree,
}

pub fn render(node: &Node, format: Format) -> anyhow::Result<String> {
    Ok(match format {
        Format::Dump => node.to_string(),
        Format::Json => serde_json::to_string_pretty(node)?,
        Format::Dot => to_dot(node.as_node_ref()),
        Format::Tree => tree(node.as_node_ref()),
    })
}

fn tree(root: NodeRef<'_>) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let content = node.content();
        write!(out, "{:indent$}{}", "", node.name(), indent = depth * 2).unwrap();
        if !content.is_empty() {
            write!(out, " {content}").unwrap();
        }
        out.push('\n');
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    out
}
