//! searchql - query IR and parser for secondary-index search
//!
//! Client query text in a compact tag/range filter syntax is parsed into a
//! typed IR tree that a planner can walk. Every node renders to a stable
//! canonical form (`Display`, also available as `dump()`), which tests and
//! diagnostics compare against and which the canonical parser reads back.
//!
//! ## Filter syntax
//!
//! - `@field:{a|b}`: tag set contains `a` or `b` (`"quoted tags"` allowed)
//! - `@field:[1 (5]`: `1 <= field < 5`; `inf`, `-inf`, `+inf` leave a side open
//! - `*`: match everything
//! - `-expr`: negation
//! - `a b`: conjunction, `a | b`: disjunction (looser), `( ... )`: grouping
//!
//! ```
//! let query = searchql::parse_query("@a:[1 inf] @b:[inf 2] | @c:[(3 inf]").unwrap();
//! assert_eq!(query.to_string(), "(or (and a >= 1, b <= 2), c > 3)");
//! ```
//!
//! ## Statements
//!
//! ```
//! let stmt = searchql::parse_statement(
//!     "select title from books where @year:[2000 inf] sortby year, desc limit 0, 10",
//! )
//! .unwrap();
//! assert_eq!(
//!     stmt.to_string(),
//!     "select title from books where year >= 2000 sortby year, desc limit 0, 10"
//! );
//! ```

mod dot;
mod dump;
pub mod ir;
mod parse;
mod sema;
mod visit;

use thiserror::Error;

// ============ Primary Public API ============

pub use ir::{
    AndExpr, BoolLiteral, Children, CompareOp, FieldRef, IndexRef, Limit, Node, NodeKind,
    NodeRef, NotExpr, NumericCompareExpr, NumericLiteral, OrExpr, QueryExpr, SearchStmt,
    SelectExpr, SortBy, SortOrder, StringLiteral, TagContainExpr, Walk,
};
pub use parse::{ParseError, parse_canonical, parse_query, parse_statement};

// ============ Analysis ============

pub use dot::{DotDumper, to_dot};
pub use sema::{
    DEFAULT_TAG_SEPARATOR, FieldInfo, FieldKind, IndexInfo, Resolution, Schema, SemaChecker,
    SemaError,
};
pub use visit::Visitor;

// ============ Errors ============

#[derive(Error, Debug)]
pub enum SearchQlError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Sema(#[from] SemaError),
}

/// Parse a statement and check it against `schema`
pub fn parse_and_check<'s>(
    statement: &str,
    schema: &'s Schema,
) -> Result<(SearchStmt, Resolution<'s>), SearchQlError> {
    let stmt = parse_statement(statement)?;
    let resolution = SemaChecker::new(schema).check(&stmt).inspect_err(|e| {
        log::debug!("statement {statement:?} failed semantic check: {e}");
    })?;
    Ok((stmt, resolution))
}
