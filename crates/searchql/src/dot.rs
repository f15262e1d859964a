//! Graphviz output for IR trees
//!
//! Walks the generic `children()` contract, so it works on any node kind.

use std::fmt::{self, Write};

use crate::dump::escape_string;
use crate::ir::NodeRef;

pub struct DotDumper<W: Write> {
    out: W,
    next_id: usize,
}

impl<W: Write> DotDumper<W> {
    pub fn new(out: W) -> Self {
        DotDumper { out, next_id: 0 }
    }

    /// Write `node` and its descendants as a complete `digraph`
    pub fn dump(&mut self, node: NodeRef<'_>) -> fmt::Result {
        writeln!(self.out, "digraph {{")?;
        self.dump_node(node)?;
        writeln!(self.out, "}}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn dump_node(&mut self, node: NodeRef<'_>) -> Result<usize, fmt::Error> {
        let id = self.next_id;
        self.next_id += 1;

        let content = node.content();
        let label = if content.is_empty() {
            node.name().to_string()
        } else {
            format!("{} ({})", node.name(), content)
        };
        writeln!(
            self.out,
            "  node{id} [ label = \"{}\" ];",
            escape_string(&label)
        )?;

        for child in node.children() {
            let child_id = self.dump_node(child)?;
            writeln!(self.out, "  node{id} -> node{child_id};")?;
        }
        Ok(id)
    }
}

/// Render a node as a Graphviz digraph
pub fn to_dot(node: NodeRef<'_>) -> String {
    let mut dumper = DotDumper::new(String::new());
    dumper.dump(node).unwrap();
    dumper.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_statement;

    fn id_of<'a>(dot: &'a str, label: &str) -> &'a str {
        let needle = format!("[ label = \"{label}");
        let line = dot
            .lines()
            .find(|l| l.contains(&needle))
            .unwrap_or_else(|| panic!("no node labelled {label} in\n{dot}"));
        line.split_whitespace().next().unwrap()
    }

    #[test]
    fn edges_follow_tree() {
        let stmt = parse_statement(
            r#"select a from b where (or c = 1, (and d hastag "x", e >= 2)) sortby e, asc limit 0, 10"#,
        )
        .unwrap();
        let dot = to_dot(stmt.as_node_ref());

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.ends_with("}\n"));

        let search_stmt = id_of(&dot, "SearchStmt");
        let or_expr = id_of(&dot, "OrExpr");
        let and_expr = id_of(&dot, "AndExpr");
        assert!(dot.contains(&format!("{search_stmt} -> {or_expr};")));
        assert!(dot.contains(&format!("{or_expr} -> {and_expr};")));
    }

    #[test]
    fn labels_carry_escaped_content() {
        let stmt = parse_statement(r#"select * from idx where t hastag "q\"uote""#).unwrap();
        let dot = to_dot(stmt.as_node_ref());
        assert!(dot.contains(r#"label = "StringLiteral (\"q\\\"uote\")""#), "{dot}");
        assert!(dot.contains(r#"label = "TagContainExpr" ];"#));
    }

    #[test]
    fn one_line_per_node_and_edge() {
        let stmt = parse_statement("select * from idx where a >= 1").unwrap();
        let dot = to_dot(stmt.as_node_ref());
        let nodes = dot.lines().filter(|l| l.contains("[ label")).count();
        let edges = dot.lines().filter(|l| l.contains("->")).count();
        // SearchStmt, SelectExpr, IndexRef, NumericCompareExpr, FieldRef, NumericLiteral
        assert_eq!(nodes, 6);
        assert_eq!(edges, 5);
        assert!(dot.contains(r#"label = "NumericCompareExpr (>=)""#));
    }
}
