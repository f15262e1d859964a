//! IR types for search queries
//!
//! Split into:
//! - this module: leaf references/literals, the owned `Node` union and the
//!   borrowed `NodeRef` view used for generic traversal
//! - `query`: boolean filter expressions (what the filter parser produces)
//! - `stmt`: statement-level clauses (`select ... from ... where ...`)
//!
//! Canonical rendering (`Display`) lives in `crate::dump`.

pub mod query;
pub mod stmt;

use serde::Serialize;

pub use query::{AndExpr, CompareOp, NotExpr, NumericCompareExpr, OrExpr, QueryExpr, TagContainExpr};
pub use stmt::{IndexRef, Limit, SearchStmt, SelectExpr, SortBy, SortOrder};

// ============ Leaves ============

/// Reference to a document field: `@price` in filter syntax, `price` in IR
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldRef {
    pub name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        FieldRef { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StringLiteral {
    pub value: String,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        StringLiteral {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericLiteral {
    pub value: f64,
}

impl NumericLiteral {
    pub fn new(value: f64) -> Self {
        NumericLiteral { value }
    }
}

/// `true` matches every document, `false` none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoolLiteral {
    pub value: bool,
}

impl BoolLiteral {
    pub fn new(value: bool) -> Self {
        BoolLiteral { value }
    }
}

// ============ Owned node union ============

/// Any IR node, owned
///
/// The set of kinds is closed. Query expressions nest as [`QueryExpr`]
/// inside their parents; `Node` is the type-erased form used by passes
/// that can rewrite one kind into another.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    FieldRef(FieldRef),
    IndexRef(IndexRef),
    StringLiteral(StringLiteral),
    NumericLiteral(NumericLiteral),
    BoolLiteral(BoolLiteral),
    TagContainExpr(TagContainExpr),
    NumericCompareExpr(NumericCompareExpr),
    NotExpr(NotExpr),
    AndExpr(AndExpr),
    OrExpr(OrExpr),
    SelectExpr(SelectExpr),
    Limit(Limit),
    SortBy(SortBy),
    SearchStmt(SearchStmt),
}

impl Node {
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Node::FieldRef(n) => NodeRef::FieldRef(n),
            Node::IndexRef(n) => NodeRef::IndexRef(n),
            Node::StringLiteral(n) => NodeRef::StringLiteral(n),
            Node::NumericLiteral(n) => NodeRef::NumericLiteral(n),
            Node::BoolLiteral(n) => NodeRef::BoolLiteral(n),
            Node::TagContainExpr(n) => NodeRef::TagContainExpr(n),
            Node::NumericCompareExpr(n) => NodeRef::NumericCompareExpr(n),
            Node::NotExpr(n) => NodeRef::NotExpr(n),
            Node::AndExpr(n) => NodeRef::AndExpr(n),
            Node::OrExpr(n) => NodeRef::OrExpr(n),
            Node::SelectExpr(n) => NodeRef::SelectExpr(n),
            Node::Limit(n) => NodeRef::Limit(n),
            Node::SortBy(n) => NodeRef::SortBy(n),
            Node::SearchStmt(n) => NodeRef::SearchStmt(n),
        }
    }

    pub fn name(&self) -> &'static str {
        self.as_node_ref().name()
    }

    pub fn content(&self) -> String {
        self.as_node_ref().content()
    }

    pub fn children(&self) -> Children<'_> {
        self.as_node_ref().children()
    }

    /// Canonical rendering, same as `to_string()`
    pub fn dump(&self) -> String {
        self.to_string()
    }

    /// Downcast to a concrete kind, returning the node back on mismatch
    pub fn try_cast<T: NodeKind>(self) -> Result<T, Node> {
        T::from_node(self)
    }

    /// Downcast to a concrete kind, dropping the node on mismatch
    pub fn cast<T: NodeKind>(self) -> Option<T> {
        T::from_node(self).ok()
    }

    /// Downcast where the kind is already known from the tree structure.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a `T`. A mismatch is a bug in the caller,
    /// not a property of user input.
    pub fn must_cast<T: NodeKind>(self) -> T {
        match T::from_node(self) {
            Ok(node) => node,
            Err(node) => panic!(
                "IR invariant violated: expected {}, found {}",
                T::KIND,
                node.name()
            ),
        }
    }
}

/// A concrete node kind (or category) that a [`Node`] can be cast into
pub trait NodeKind: Sized + Into<Node> {
    const KIND: &'static str;

    fn from_node(node: Node) -> Result<Self, Node>;
}

macro_rules! node_kind {
    ($($ty:ident),* $(,)?) => {
        $(
            impl NodeKind for $ty {
                const KIND: &'static str = stringify!($ty);

                fn from_node(node: Node) -> Result<Self, Node> {
                    match node {
                        Node::$ty(n) => Ok(n),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for Node {
                fn from(n: $ty) -> Self {
                    Node::$ty(n)
                }
            }
        )*
    };
}

node_kind!(
    FieldRef,
    IndexRef,
    StringLiteral,
    NumericLiteral,
    BoolLiteral,
    TagContainExpr,
    NumericCompareExpr,
    NotExpr,
    AndExpr,
    OrExpr,
    SelectExpr,
    Limit,
    SortBy,
    SearchStmt,
);

impl NodeKind for QueryExpr {
    const KIND: &'static str = "QueryExpr";

    fn from_node(node: Node) -> Result<Self, Node> {
        match node {
            Node::TagContainExpr(n) => Ok(QueryExpr::TagContain(n)),
            Node::NumericCompareExpr(n) => Ok(QueryExpr::NumericCompare(n)),
            Node::BoolLiteral(n) => Ok(QueryExpr::Bool(n)),
            Node::NotExpr(n) => Ok(QueryExpr::Not(n)),
            Node::AndExpr(n) => Ok(QueryExpr::And(n)),
            Node::OrExpr(n) => Ok(QueryExpr::Or(n)),
            other => Err(other),
        }
    }
}

impl From<QueryExpr> for Node {
    fn from(expr: QueryExpr) -> Self {
        match expr {
            QueryExpr::TagContain(n) => Node::TagContainExpr(n),
            QueryExpr::NumericCompare(n) => Node::NumericCompareExpr(n),
            QueryExpr::Bool(n) => Node::BoolLiteral(n),
            QueryExpr::Not(n) => Node::NotExpr(n),
            QueryExpr::And(n) => Node::AndExpr(n),
            QueryExpr::Or(n) => Node::OrExpr(n),
        }
    }
}

// ============ Borrowed view ============

/// Ordered, lazy sequence of a node's immediate children
pub type Children<'a> = Box<dyn Iterator<Item = NodeRef<'a>> + 'a>;

/// Borrowed reference to any IR node
///
/// This is what generic consumers (DOT dumper, planners, walkers) use:
/// `name`/`content`/`children` work without knowing the concrete kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    FieldRef(&'a FieldRef),
    IndexRef(&'a IndexRef),
    StringLiteral(&'a StringLiteral),
    NumericLiteral(&'a NumericLiteral),
    BoolLiteral(&'a BoolLiteral),
    TagContainExpr(&'a TagContainExpr),
    NumericCompareExpr(&'a NumericCompareExpr),
    NotExpr(&'a NotExpr),
    AndExpr(&'a AndExpr),
    OrExpr(&'a OrExpr),
    SelectExpr(&'a SelectExpr),
    Limit(&'a Limit),
    SortBy(&'a SortBy),
    SearchStmt(&'a SearchStmt),
}

impl<'a> NodeRef<'a> {
    /// Kind tag, stable across releases (used in diagnostics and DOT labels)
    pub fn name(self) -> &'static str {
        match self {
            NodeRef::FieldRef(_) => "FieldRef",
            NodeRef::IndexRef(_) => "IndexRef",
            NodeRef::StringLiteral(_) => "StringLiteral",
            NodeRef::NumericLiteral(_) => "NumericLiteral",
            NodeRef::BoolLiteral(_) => "BoolLiteral",
            NodeRef::TagContainExpr(_) => "TagContainExpr",
            NodeRef::NumericCompareExpr(_) => "NumericCompareExpr",
            NodeRef::NotExpr(_) => "NotExpr",
            NodeRef::AndExpr(_) => "AndExpr",
            NodeRef::OrExpr(_) => "OrExpr",
            NodeRef::SelectExpr(_) => "SelectExpr",
            NodeRef::Limit(_) => "Limit",
            NodeRef::SortBy(_) => "SortBy",
            NodeRef::SearchStmt(_) => "SearchStmt",
        }
    }

    /// Short value summary, independent of children. Empty for most composites.
    pub fn content(self) -> String {
        match self {
            NodeRef::FieldRef(_)
            | NodeRef::IndexRef(_)
            | NodeRef::StringLiteral(_)
            | NodeRef::NumericLiteral(_)
            | NodeRef::BoolLiteral(_) => self.to_string(),
            NodeRef::NumericCompareExpr(n) => n.op.symbol().to_string(),
            NodeRef::Limit(n) => format!("{}, {}", n.offset, n.count),
            NodeRef::SortBy(n) => n.order.as_str().to_string(),
            NodeRef::TagContainExpr(_)
            | NodeRef::NotExpr(_)
            | NodeRef::AndExpr(_)
            | NodeRef::OrExpr(_)
            | NodeRef::SelectExpr(_)
            | NodeRef::SearchStmt(_) => String::new(),
        }
    }

    pub fn children(self) -> Children<'a> {
        match self {
            NodeRef::FieldRef(_)
            | NodeRef::IndexRef(_)
            | NodeRef::StringLiteral(_)
            | NodeRef::NumericLiteral(_)
            | NodeRef::BoolLiteral(_)
            | NodeRef::Limit(_) => Box::new(std::iter::empty()),
            NodeRef::TagContainExpr(n) => Box::new(
                [NodeRef::FieldRef(&n.field), NodeRef::StringLiteral(&n.tag)].into_iter(),
            ),
            NodeRef::NumericCompareExpr(n) => Box::new(
                [NodeRef::FieldRef(&n.field), NodeRef::NumericLiteral(&n.num)].into_iter(),
            ),
            NodeRef::NotExpr(n) => Box::new(std::iter::once(n.inner.as_node_ref())),
            NodeRef::AndExpr(n) => Box::new(n.inners().iter().map(QueryExpr::as_node_ref)),
            NodeRef::OrExpr(n) => Box::new(n.inners().iter().map(QueryExpr::as_node_ref)),
            NodeRef::SelectExpr(n) => Box::new(n.fields.iter().map(NodeRef::FieldRef)),
            NodeRef::SortBy(n) => Box::new(std::iter::once(NodeRef::FieldRef(&n.field))),
            NodeRef::SearchStmt(n) => Box::new(
                [
                    Some(NodeRef::SelectExpr(&n.select)),
                    Some(NodeRef::IndexRef(&n.index)),
                    n.query.as_ref().map(QueryExpr::as_node_ref),
                    n.limit.as_ref().map(NodeRef::Limit),
                    n.sort_by.as_ref().map(NodeRef::SortBy),
                ]
                .into_iter()
                .flatten(),
            ),
        }
    }

    /// Pre-order walk over this node and all of its descendants
    pub fn walk(self) -> Walk<'a> {
        Walk { stack: vec![self] }
    }

    pub fn dump(self) -> String {
        self.to_string()
    }
}

/// Pre-order iterator returned by [`NodeRef::walk`]
pub struct Walk<'a> {
    stack: Vec<NodeRef<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mark = self.stack.len();
        self.stack.extend(node.children());
        self.stack[mark..].reverse();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stmt() -> SearchStmt {
        SearchStmt::new(SelectExpr::all(), IndexRef::new("idx"))
            .with_query(QueryExpr::and(vec![
                QueryExpr::compare("a", CompareOp::Ge, 1.0),
                QueryExpr::tag("b", "x"),
            ]))
            .with_sort_by(SortBy::new(SortOrder::Desc, FieldRef::new("a")))
            .with_limit(Limit::new(0, 10))
    }

    #[test]
    fn names_and_content() {
        let cmp = QueryExpr::compare("a", CompareOp::Le, 2.5);
        let cmp_ref = cmp.as_node_ref();
        assert_eq!(cmp_ref.name(), "NumericCompareExpr");
        assert_eq!(cmp_ref.content(), "<=");

        let tag = StringLiteral::new("x");
        assert_eq!(NodeRef::StringLiteral(&tag).content(), "\"x\"");

        let limit = Limit::new(3, 7);
        assert_eq!(NodeRef::Limit(&limit).content(), "3, 7");

        let and = QueryExpr::and(vec![QueryExpr::truth(), QueryExpr::truth()]);
        assert_eq!(and.as_node_ref().content(), "");
    }

    #[test]
    fn search_stmt_children_skip_absent_optionals() {
        let bare = SearchStmt::new(SelectExpr::all(), IndexRef::new("idx"));
        let names: Vec<_> = bare.as_node_ref().children().map(NodeRef::name).collect();
        assert_eq!(names, ["SelectExpr", "IndexRef"]);

        let full = sample_stmt();
        let names: Vec<_> = full.as_node_ref().children().map(NodeRef::name).collect();
        assert_eq!(
            names,
            ["SelectExpr", "IndexRef", "AndExpr", "Limit", "SortBy"]
        );
    }

    #[test]
    fn walk_is_pre_order() {
        let stmt = sample_stmt();
        let names: Vec<_> = stmt.as_node_ref().walk().map(NodeRef::name).collect();
        assert_eq!(
            names,
            [
                "SearchStmt",
                "SelectExpr",
                "IndexRef",
                "AndExpr",
                "NumericCompareExpr",
                "FieldRef",
                "NumericLiteral",
                "TagContainExpr",
                "FieldRef",
                "StringLiteral",
                "Limit",
                "SortBy",
                "FieldRef",
            ]
        );
    }

    #[test]
    fn cast_between_node_and_query() {
        let node: Node = QueryExpr::tag("a", "x").into();
        assert_eq!(node.name(), "TagContainExpr");

        let query = node.clone().cast::<QueryExpr>().unwrap();
        assert_eq!(query, QueryExpr::tag("a", "x"));
        assert!(node.clone().cast::<NumericCompareExpr>().is_none());

        let back = node.try_cast::<FieldRef>().unwrap_err();
        assert_eq!(back.name(), "TagContainExpr");
    }

    #[test]
    fn must_cast_matching_kind() {
        let node = Node::FieldRef(FieldRef::new("a"));
        assert_eq!(node.must_cast::<FieldRef>().name, "a");
    }

    #[test]
    #[should_panic(expected = "expected QueryExpr, found FieldRef")]
    fn must_cast_mismatch_panics() {
        Node::FieldRef(FieldRef::new("a")).must_cast::<QueryExpr>();
    }
}
