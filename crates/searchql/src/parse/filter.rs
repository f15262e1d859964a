//! Compact filter syntax
//!
//! ```text
//! query     := and_expr ( '|' and_expr )*
//! and_expr  := term+
//! term      := field_query | '(' query ')' | '-' term | '*'
//! field_query := '@' ident ':' ( '{' tag ( '|' tag )* '}' | '[' lower upper ']' )
//! ```
//!
//! Juxtaposed terms become one flat `AndExpr`, `|`-separated groups one flat
//! `OrExpr`. Numeric ranges are split into one comparison per finite bound.

use winnow::combinator::{alt, delimited, preceded, repeat, separated};
use winnow::prelude::*;

use super::{PResult, ident, number, string_lit, ws};
use crate::ir::{CompareOp, QueryExpr};

// ============ Boolean structure ============

pub(super) fn query_expr(input: &mut &str) -> PResult<QueryExpr> {
    or_expr.parse_next(input)
}

fn or_expr(input: &mut &str) -> PResult<QueryExpr> {
    let first = and_expr.parse_next(input)?;
    let rest: Vec<QueryExpr> = repeat(0.., preceded((ws, '|'), and_expr)).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut inners = Vec::with_capacity(rest.len() + 1);
    inners.push(first);
    inners.extend(rest);
    Ok(QueryExpr::or(inners))
}

fn and_expr(input: &mut &str) -> PResult<QueryExpr> {
    let terms: Vec<QueryExpr> = repeat(1.., term).parse_next(input)?;
    Ok(conjunction(terms))
}

fn term(input: &mut &str) -> PResult<QueryExpr> {
    preceded(ws, alt((field_query, paren_expr, not_expr, wildcard))).parse_next(input)
}

fn paren_expr(input: &mut &str) -> PResult<QueryExpr> {
    delimited('(', query_expr, (ws, ')')).parse_next(input)
}

fn not_expr(input: &mut &str) -> PResult<QueryExpr> {
    preceded('-', term).map(QueryExpr::not).parse_next(input)
}

fn wildcard(input: &mut &str) -> PResult<QueryExpr> {
    '*'.map(|_| QueryExpr::truth()).parse_next(input)
}

/// Zero terms match everything, one term stands alone, more are conjoined
fn conjunction(mut terms: Vec<QueryExpr>) -> QueryExpr {
    match terms.len() {
        0 => QueryExpr::truth(),
        1 => terms.remove(0),
        _ => QueryExpr::and(terms),
    }
}

// ============ Field predicates ============

enum Predicate {
    Tags(Vec<String>),
    Range(Bound, Bound),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

fn field_query(input: &mut &str) -> PResult<QueryExpr> {
    let field = preceded('@', ident).parse_next(input)?;
    let predicate = preceded((ws, ':', ws), alt((tag_list, numeric_range))).parse_next(input)?;

    Ok(match predicate {
        Predicate::Tags(tags) => expand_tags(&field, tags),
        Predicate::Range(lower, upper) => decompose_range(&field, lower, upper),
    })
}

fn tag_list(input: &mut &str) -> PResult<Predicate> {
    delimited(
        ('{', ws),
        separated(1.., tag, (ws, '|', ws)),
        (ws, '}'),
    )
    .map(Predicate::Tags)
    .parse_next(input)
}

fn tag(input: &mut &str) -> PResult<String> {
    alt((string_lit, ident)).parse_next(input)
}

fn numeric_range(input: &mut &str) -> PResult<Predicate> {
    delimited(
        '[',
        (ws, lower_bound, ws, upper_bound, ws),
        ']',
    )
    .map(|(_, lower, _, upper, _)| Predicate::Range(lower, upper))
    .parse_next(input)
}

/// `-inf`/`inf`, `(N` or `N`; `+inf` is not a valid lower bound
fn lower_bound(input: &mut &str) -> PResult<Bound> {
    alt((
        "-inf".value(Bound::Unbounded),
        "inf".value(Bound::Unbounded),
        bound_value,
    ))
    .parse_next(input)
}

/// `+inf`/`inf`, `(N` or `N`; `-inf` is not a valid upper bound
fn upper_bound(input: &mut &str) -> PResult<Bound> {
    alt((
        "+inf".value(Bound::Unbounded),
        "inf".value(Bound::Unbounded),
        bound_value,
    ))
    .parse_next(input)
}

fn bound_value(input: &mut &str) -> PResult<Bound> {
    alt((
        preceded('(', number).map(Bound::Exclusive),
        number.map(Bound::Inclusive),
    ))
    .parse_next(input)
}

fn expand_tags(field: &str, tags: Vec<String>) -> QueryExpr {
    let mut exprs: Vec<QueryExpr> = tags
        .into_iter()
        .map(|tag| QueryExpr::tag(field, tag))
        .collect();
    if exprs.len() == 1 {
        exprs.remove(0)
    } else {
        QueryExpr::or(exprs)
    }
}

fn decompose_range(field: &str, lower: Bound, upper: Bound) -> QueryExpr {
    let lower = match lower {
        Bound::Unbounded => None,
        Bound::Inclusive(value) => Some((CompareOp::Ge, value)),
        Bound::Exclusive(value) => Some((CompareOp::Gt, value)),
    };
    let upper = match upper {
        Bound::Unbounded => None,
        Bound::Inclusive(value) => Some((CompareOp::Le, value)),
        Bound::Exclusive(value) => Some((CompareOp::Lt, value)),
    };
    let exprs = [lower, upper]
        .into_iter()
        .flatten()
        .map(|(op, value)| QueryExpr::compare(field, op, value))
        .collect();
    conjunction(exprs)
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
    fn range_operators_per_side() {
        let cases = [
            (Bound::Inclusive(1.0), Bound::Unbounded, CompareOp::Ge),
            (Bound::Exclusive(1.0), Bound::Unbounded, CompareOp::Gt),
            (Bound::Unbounded, Bound::Inclusive(1.0), CompareOp::Le),
            (Bound::Unbounded, Bound::Exclusive(1.0), CompareOp::Lt),
        ];
        for (lower, upper, op) in cases {
            assert_eq!(
                decompose_range("a", lower, upper),
                QueryExpr::compare("a", op, 1.0)
            );
        }
        assert_eq!(
            decompose_range("a", Bound::Unbounded, Bound::Unbounded),
            QueryExpr::truth()
        );
        assert_eq!(
            decompose_range("a", Bound::Exclusive(1.0), Bound::Inclusive(2.0)),
            QueryExpr::and(vec![
                QueryExpr::compare("a", CompareOp::Gt, 1.0),
                QueryExpr::compare("a", CompareOp::Le, 2.0),
            ])
        );
    }

    #[test]
    fn bounds() {
        let mut s = "(1.5";
        assert_eq!(lower_bound.parse_next(&mut s).ok(), Some(Bound::Exclusive(1.5)));
        let mut s = "+inf";
        assert!(lower_bound.parse_next(&mut s).is_err());
        let mut s = "-inf";
        assert!(upper_bound.parse_next(&mut s).is_err());
        let mut s = "-3";
        assert_eq!(upper_bound.parse_next(&mut s).ok(), Some(Bound::Inclusive(-3.0)));
    }

    #[test]
    fn single_bound_is_not_wrapped() {
        let q = parse("@a:[(1 inf]").unwrap();
        assert_eq!(q, QueryExpr::compare("a", CompareOp::Gt, 1.0));
    }

    #[test]
    fn flat_conjunction() {
        let q = parse("@a:{x} @b:{y} @c:{z} *").unwrap();
        match q {
            QueryExpr::And(and) => assert_eq!(and.inners().len(), 4),
            other => panic!("expected AndExpr, got {}", other.name()),
        }
    }

    #[test]
    fn parens_keep_their_own_node() {
        let q = parse("(@a:{x} @b:{y}) @c:{z}").unwrap();
        let QueryExpr::And(outer) = q else {
            panic!("expected AndExpr");
        };
        assert_eq!(outer.inners().len(), 2);
        assert!(matches!(outer.inners()[0], QueryExpr::And(_)));
    }

    #[test]
    fn quoted_tags_keep_spaces() {
        let q = parse(r#"@a:{"hello world"|x}"#).unwrap();
        assert_eq!(q.to_string(), r#"(or a hastag "hello world", a hastag "x")"#);
    }

    #[test]
    fn rejects_bad_bounds() {
        for input in ["@a:[+inf 1]", "@a:[1 -inf]", "@a:[(inf 1]", "@a:[((1 2]", "@a:[1 1e999]"] {
            assert!(parse(input).is_none(), "{input}");
        }
    }
}
