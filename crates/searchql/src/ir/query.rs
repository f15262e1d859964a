//! Boolean filter expressions
//!
//! Atoms (`TagContain`, `NumericCompare`, `Bool`) plus the `Not`/`And`/`Or`
//! combinators. `And`/`Or` are n-ary and stored flat.

use serde::Serialize;

use super::{BoolLiteral, FieldRef, NodeRef, NumericLiteral, StringLiteral};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum QueryExpr {
    /// Field's tag set contains a tag: `a hastag "x"`
    #[serde(rename = "TagContainExpr")]
    TagContain(TagContainExpr),

    /// Numeric comparison against a constant: `a >= 1`
    #[serde(rename = "NumericCompareExpr")]
    NumericCompare(NumericCompareExpr),

    /// Match everything / nothing
    #[serde(rename = "BoolLiteral")]
    Bool(BoolLiteral),

    #[serde(rename = "NotExpr")]
    Not(NotExpr),

    #[serde(rename = "AndExpr")]
    And(AndExpr),

    #[serde(rename = "OrExpr")]
    Or(OrExpr),
}

impl QueryExpr {
    pub fn tag(field: impl Into<String>, tag: impl Into<String>) -> Self {
        QueryExpr::TagContain(TagContainExpr::new(
            FieldRef::new(field),
            StringLiteral::new(tag),
        ))
    }

    pub fn compare(field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        QueryExpr::NumericCompare(NumericCompareExpr::new(
            op,
            FieldRef::new(field),
            NumericLiteral::new(value),
        ))
    }

    pub fn truth() -> Self {
        QueryExpr::Bool(BoolLiteral::new(true))
    }

    pub fn falsity() -> Self {
        QueryExpr::Bool(BoolLiteral::new(false))
    }

    pub fn not(inner: QueryExpr) -> Self {
        QueryExpr::Not(NotExpr::new(inner))
    }

    /// # Panics
    ///
    /// Panics if `inners` is empty.
    pub fn and(inners: Vec<QueryExpr>) -> Self {
        QueryExpr::And(AndExpr::new(inners))
    }

    /// # Panics
    ///
    /// Panics if `inners` is empty.
    pub fn or(inners: Vec<QueryExpr>) -> Self {
        QueryExpr::Or(OrExpr::new(inners))
    }

    /// Atomic, non-composite predicate
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            QueryExpr::TagContain(_) | QueryExpr::NumericCompare(_) | QueryExpr::Bool(_)
        )
    }

    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            QueryExpr::TagContain(n) => NodeRef::TagContainExpr(n),
            QueryExpr::NumericCompare(n) => NodeRef::NumericCompareExpr(n),
            QueryExpr::Bool(n) => NodeRef::BoolLiteral(n),
            QueryExpr::Not(n) => NodeRef::NotExpr(n),
            QueryExpr::And(n) => NodeRef::AndExpr(n),
            QueryExpr::Or(n) => NodeRef::OrExpr(n),
        }
    }

    pub fn name(&self) -> &'static str {
        self.as_node_ref().name()
    }

    pub fn dump(&self) -> String {
        self.to_string()
    }
}

// ============ Atoms ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagContainExpr {
    pub field: FieldRef,
    pub tag: StringLiteral,
}

impl TagContainExpr {
    pub fn new(field: FieldRef, tag: StringLiteral) -> Self {
        TagContainExpr { field, tag }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericCompareExpr {
    pub op: CompareOp,
    pub field: FieldRef,
    pub num: NumericLiteral,
}

impl NumericCompareExpr {
    pub fn new(op: CompareOp, field: FieldRef, num: NumericLiteral) -> Self {
        NumericCompareExpr { op, field, num }
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Gt,
        CompareOp::Ge,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        CompareOp::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Logical complement: `!(x op n)` is `x op.negate() n`
    pub fn negate(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Ne,
            CompareOp::Ne => CompareOp::Eq,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Le => CompareOp::Gt,
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Ge => CompareOp::Lt,
        }
    }

    /// Operand swap: `x op n` is `n op.flip() x`
    pub fn flip(self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    /// Apply the operator to concrete values
    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

// ============ Combinators ============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotExpr {
    pub inner: Box<QueryExpr>,
}

impl NotExpr {
    pub fn new(inner: QueryExpr) -> Self {
        NotExpr {
            inner: Box::new(inner),
        }
    }
}

/// Conjunction of one or more expressions, stored flat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AndExpr {
    inners: Vec<QueryExpr>,
}

impl AndExpr {
    /// # Panics
    ///
    /// Panics if `inners` is empty.
    pub fn new(inners: Vec<QueryExpr>) -> Self {
        assert!(!inners.is_empty(), "AndExpr requires at least one operand");
        AndExpr { inners }
    }

    pub fn inners(&self) -> &[QueryExpr] {
        &self.inners
    }

    pub fn into_inners(self) -> Vec<QueryExpr> {
        self.inners
    }
}

/// Disjunction of one or more expressions, stored flat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrExpr {
    inners: Vec<QueryExpr>,
}

impl OrExpr {
    /// # Panics
    ///
    /// Panics if `inners` is empty.
    pub fn new(inners: Vec<QueryExpr>) -> Self {
        assert!(!inners.is_empty(), "OrExpr requires at least one operand");
        OrExpr { inners }
    }

    pub fn inners(&self) -> &[QueryExpr] {
        &self.inners
    }

    pub fn into_inners(self) -> Vec<QueryExpr> {
        self.inners
    }
}
