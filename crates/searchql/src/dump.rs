//! Canonical rendering (`Dump`) for IR nodes
//!
//! The output is part of the public contract: tests and diagnostics compare
//! against it verbatim, and `parse_canonical` / `parse_statement` read it back.

use std::fmt::{self, Display};

use crate::ir::{
    AndExpr, BoolLiteral, CompareOp, FieldRef, IndexRef, Limit, Node, NodeRef, NotExpr,
    NumericCompareExpr, NumericLiteral, OrExpr, QueryExpr, SearchStmt, SelectExpr, SortBy,
    SortOrder, StringLiteral, TagContainExpr,
};

// ============ Leaves ============

impl Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for IndexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_string(&self.value))
    }
}

impl Display for NumericLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // shortest round-trip digits; exponent form outside 1e-4 <= |v| < 1e16
        let sci = format!("{:e}", self.value);
        let split = sci
            .split_once('e')
            .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));
        match split {
            Some((mantissa, exp)) if !(-4..16).contains(&exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Display for BoolLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.value { "true" } else { "false" })
    }
}

// ============ Query expressions ============

impl Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for TagContainExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hastag {}", self.field, self.tag)
    }
}

impl Display for NumericCompareExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.num)
    }
}

impl Display for NotExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not {}", self.inner)
    }
}

impl Display for AndExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(and ")?;
        write_joined(f, self.inners())?;
        write!(f, ")")
    }
}

impl Display for OrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(or ")?;
        write_joined(f, self.inners())?;
        write!(f, ")")
    }
}

impl Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpr::TagContain(e) => e.fmt(f),
            QueryExpr::NumericCompare(e) => e.fmt(f),
            QueryExpr::Bool(e) => e.fmt(f),
            QueryExpr::Not(e) => e.fmt(f),
            QueryExpr::And(e) => e.fmt(f),
            QueryExpr::Or(e) => e.fmt(f),
        }
    }
}

// ============ Statements ============

impl Display for SelectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "select *");
        }
        write!(f, "select ")?;
        write_joined(f, &self.fields)
    }
}

impl Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit {}, {}", self.offset, self.count)
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sortby {}, {}", self.field, self.order)
    }
}

impl Display for SearchStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.select, self.index)?;
        if let Some(query) = &self.query {
            write!(f, " where {}", query)?;
        }
        if let Some(sort_by) = &self.sort_by {
            write!(f, " {}", sort_by)?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " {}", limit)?;
        }
        Ok(())
    }
}

// ============ Type-erased ============

impl Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NodeRef::FieldRef(n) => n.fmt(f),
            NodeRef::IndexRef(n) => n.fmt(f),
            NodeRef::StringLiteral(n) => n.fmt(f),
            NodeRef::NumericLiteral(n) => n.fmt(f),
            NodeRef::BoolLiteral(n) => n.fmt(f),
            NodeRef::TagContainExpr(n) => n.fmt(f),
            NodeRef::NumericCompareExpr(n) => n.fmt(f),
            NodeRef::NotExpr(n) => n.fmt(f),
            NodeRef::AndExpr(n) => n.fmt(f),
            NodeRef::OrExpr(n) => n.fmt(f),
            NodeRef::SelectExpr(n) => n.fmt(f),
            NodeRef::Limit(n) => n.fmt(f),
            NodeRef::SortBy(n) => n.fmt(f),
            NodeRef::SearchStmt(n) => n.fmt(f),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_node_ref().fmt(f)
    }
}

fn write_joined<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Escape a string for use between double quotes.
///
/// `"` `\` and the common control characters get short escapes, other ASCII
/// control characters become `\xHH`. Everything else, including non-ASCII
/// text, is copied as is.
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
