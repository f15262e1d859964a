//! Canonical form and statements
//!
//! Reads back exactly what `Dump` prints:
//!
//! ```text
//! query := '(' ('and' | 'or') query ( ',' query )* ')'
//!        | ident 'hastag' string
//!        | ident op number
//!        | 'not' query
//!        | 'true' | 'false'
//! stmt  := 'select' ( '*' | ident ( ',' ident )* ) 'from' ident
//!          [ 'where' query ] [ 'sortby' ident ',' ('asc' | 'desc') ] [ 'limit' uint ',' uint ]
//! ```
//!
//! Field names may collide with keywords (`not >= 1` compares a field named
//! `not`), so field predicates are tried before the keyword forms.

use winnow::combinator::{alt, opt, preceded, separated};
use winnow::prelude::*;

use super::{PResult, filter, ident, keyword, number, string_lit, unsigned, ws, ws1};
use crate::ir::{
    AndExpr, CompareOp, FieldRef, IndexRef, Limit, NotExpr, NumericCompareExpr, NumericLiteral,
    OrExpr, QueryExpr, SearchStmt, SelectExpr, SortBy, SortOrder, StringLiteral, TagContainExpr,
};

// ============ Query expressions ============

pub(super) fn query_expr(input: &mut &str) -> PResult<QueryExpr> {
    preceded(ws, alt((junction, field_predicate, negation, bool_lit))).parse_next(input)
}

#[derive(Clone, Copy)]
enum Junction {
    And,
    Or,
}

fn junction(input: &mut &str) -> PResult<QueryExpr> {
    let kind = preceded(
        ('(', ws),
        alt((
            keyword("and").value(Junction::And),
            keyword("or").value(Junction::Or),
        )),
    )
    .parse_next(input)?;
    let inners: Vec<QueryExpr> = separated(1.., query_expr, (ws, ',')).parse_next(input)?;
    (ws, ')').parse_next(input)?;

    Ok(match kind {
        Junction::And => QueryExpr::And(AndExpr::new(inners)),
        Junction::Or => QueryExpr::Or(OrExpr::new(inners)),
    })
}

enum Comparison {
    HasTag(String),
    Numeric(CompareOp, f64),
}

fn field_predicate(input: &mut &str) -> PResult<QueryExpr> {
    let field = ident.map(FieldRef::new).parse_next(input)?;
    let comparison = alt((
        preceded((ws1, keyword("hastag"), ws), string_lit).map(Comparison::HasTag),
        (ws, compare_op, ws, number).map(|(_, op, _, value)| Comparison::Numeric(op, value)),
    ))
    .parse_next(input)?;

    Ok(match comparison {
        Comparison::HasTag(tag) => {
            QueryExpr::TagContain(TagContainExpr::new(field, StringLiteral::new(tag)))
        }
        Comparison::Numeric(op, value) => QueryExpr::NumericCompare(NumericCompareExpr::new(
            op,
            field,
            NumericLiteral::new(value),
        )),
    })
}

fn compare_op(input: &mut &str) -> PResult<CompareOp> {
    alt((
        ">=".value(CompareOp::Ge),
        "<=".value(CompareOp::Le),
        "!=".value(CompareOp::Ne),
        "=".value(CompareOp::Eq),
        "<".value(CompareOp::Lt),
        ">".value(CompareOp::Gt),
    ))
    .parse_next(input)
}

fn negation(input: &mut &str) -> PResult<QueryExpr> {
    preceded(keyword("not"), query_expr)
        .map(|inner| QueryExpr::Not(NotExpr::new(inner)))
        .parse_next(input)
}

fn bool_lit(input: &mut &str) -> PResult<QueryExpr> {
    alt((
        keyword("true").map(|_| QueryExpr::truth()),
        keyword("false").map(|_| QueryExpr::falsity()),
    ))
    .parse_next(input)
}

// ============ Statements ============

pub(super) fn search_stmt(input: &mut &str) -> PResult<SearchStmt> {
    let select = preceded((keyword("select"), ws), select_expr).parse_next(input)?;
    let index = preceded((ws1, keyword("from"), ws1), ident)
        .map(IndexRef::new)
        .parse_next(input)?;
    let query = opt(preceded((ws1, keyword("where"), ws1), where_clause)).parse_next(input)?;
    let sort_by = opt(preceded((ws1, keyword("sortby"), ws1), sort_by)).parse_next(input)?;
    let limit = opt(preceded((ws1, keyword("limit"), ws1), limit)).parse_next(input)?;

    Ok(SearchStmt {
        select,
        index,
        query,
        limit,
        sort_by,
    })
}

fn select_expr(input: &mut &str) -> PResult<SelectExpr> {
    alt((
        '*'.map(|_| SelectExpr::all()),
        separated(1.., ident.map(FieldRef::new), (ws, ',', ws)).map(SelectExpr::new),
    ))
    .parse_next(input)
}

fn where_clause(input: &mut &str) -> PResult<QueryExpr> {
    alt((query_expr, filter::query_expr)).parse_next(input)
}

fn sort_by(input: &mut &str) -> PResult<SortBy> {
    (ident, ws, ',', ws, sort_order)
        .map(|(field, _, _, _, order)| SortBy::new(order, FieldRef::new(field)))
        .parse_next(input)
}

fn sort_order(input: &mut &str) -> PResult<SortOrder> {
    alt((
        keyword("asc").value(SortOrder::Asc),
        keyword("desc").value(SortOrder::Desc),
    ))
    .parse_next(input)
}

fn limit(input: &mut &str) -> PResult<Limit> {
    (unsigned, ws, ',', ws, unsigned)
        .map(|(offset, _, _, _, count)| Limit::new(offset, count))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Option<QueryExpr> {
        let mut stream = input;
        let out = query_expr.parse_next(&mut stream).ok()?;
        stream.trim_matches(crate::parse::WHITESPACE).is_empty().then_some(out)
    }

    #[test]
    fn keywords_as_field_names() {
        assert_eq!(
            parse("not >= 1"),
            Some(QueryExpr::compare("not", CompareOp::Ge, 1.0))
        );
        assert_eq!(
            parse("not not = 1"),
            Some(QueryExpr::not(QueryExpr::compare("not", CompareOp::Eq, 1.0)))
        );
        assert_eq!(
            parse(r#"true hastag "x""#),
            Some(QueryExpr::tag("true", "x"))
        );
        assert_eq!(parse("true"), Some(QueryExpr::truth()));
        assert_eq!(
            parse(r#"hastag hastag "y""#),
            Some(QueryExpr::tag("hastag", "y"))
        );
    }

    #[test]
    fn single_operand_junction_is_kept() {
        let q = parse("(and a = 1)").unwrap();
        assert!(matches!(q, QueryExpr::And(ref and) if and.inners().len() == 1));
    }

    #[test]
    fn rejects_malformed() {
        for input in ["(and)", "(xor a = 1)", "a == 1", "a hastag x", "nota", "(and a = 1"] {
            assert!(parse(input).is_none(), "{input}");
        }
    }

    #[test]
    fn limit_and_sort() {
        let mut s = "3, 10";
        assert_eq!(limit.parse_next(&mut s).ok(), Some(Limit::new(3, 10)));
        let mut s = "price , desc";
        assert_eq!(
            sort_by.parse_next(&mut s).ok(),
            Some(SortBy::new(SortOrder::Desc, FieldRef::new("price")))
        );
    }
}
