//! Parsers producing IR
//!
//! - `filter`: compact filter syntax, e.g. `@a:[1 (2] -@b:{x|"y z"}`
//! - `canonical`: the form `Dump` prints, plus full `select` statements
//!
//! Every grammar violation surfaces as the same [`ParseError`]; the position
//! it carries is best effort.

mod canonical;
mod filter;

use std::fmt::Display;

use thiserror::Error;
use winnow::ascii::{digit1, multispace0, multispace1};
use winnow::combinator::{alt, delimited, not, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{none_of, one_of, take_while};

use crate::ir::{QueryExpr, SearchStmt};

type PResult<T> = winnow::ModalResult<T>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid syntax (line {line}, column {column}, offset {offset})")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Parse a query in compact filter syntax
///
/// ```
/// let query = searchql::parse_query("@a:[1 (2] | @b:{x|y}").unwrap();
/// assert_eq!(
///     query.to_string(),
///     r#"(or (and a >= 1, a < 2), (or b hastag "x", b hastag "y"))"#
/// );
/// ```
pub fn parse_query(input: &str) -> Result<QueryExpr, ParseError> {
    run(input, filter::query_expr)
}

/// Parse a query expression in canonical (`Dump`) form
///
/// ```
/// let query = searchql::parse_canonical(r#"(and a >= 1, not b hastag "x")"#).unwrap();
/// assert_eq!(query.to_string(), r#"(and a >= 1, not b hastag "x")"#);
/// ```
pub fn parse_canonical(input: &str) -> Result<QueryExpr, ParseError> {
    run(input, canonical::query_expr)
}

/// Parse a full statement:
/// `select <fields|*> from <index> [where <query>] [sortby <field>, <asc|desc>] [limit <offset>, <count>]`
///
/// The `where` clause accepts either canonical form or compact filter syntax.
pub fn parse_statement(input: &str) -> Result<SearchStmt, ParseError> {
    run(input, canonical::search_stmt)
}

fn run<O: Display>(
    input: &str,
    mut parser: impl FnMut(&mut &str) -> PResult<O>,
) -> Result<O, ParseError> {
    let input = input.trim_matches(WHITESPACE);
    let mut stream = input;
    match parser.parse_next(&mut stream) {
        Ok(parsed) if stream.trim_start_matches(WHITESPACE).is_empty() => {
            log::trace!("parsed {input:?} as {parsed}");
            Ok(parsed)
        }
        Ok(_) => {
            let offset = input.len() - stream.trim_start_matches(WHITESPACE).len();
            log::debug!("rejected {input:?}: unexpected trailing input at offset {offset}");
            Err(build_parse_error(input, offset))
        }
        Err(e) => {
            let offset = input.len().saturating_sub(stream.len());
            log::debug!("rejected {input:?} at offset {offset}: {}", describe(&e));
            Err(build_parse_error(input, offset))
        }
    }
}

fn describe(e: &ErrMode<ContextError>) -> String {
    match e {
        ErrMode::Backtrack(c) | ErrMode::Cut(c) => {
            let detail = c.to_string();
            if detail.is_empty() {
                "no alternative matched".to_string()
            } else {
                detail
            }
        }
        ErrMode::Incomplete(_) => "incomplete input".to_string(),
    }
}

fn build_parse_error(input: &str, offset: usize) -> ParseError {
    let (line, column) = offset_to_line_column(input, offset);
    ParseError {
        offset,
        line,
        column,
    }
}

fn offset_to_line_column(input: &str, offset: usize) -> (usize, usize) {
    let bounded = offset.min(input.len());
    let mut line = 1usize;
    let mut column = 1usize;

    for ch in input[..bounded].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

// ============ Lexical pieces shared by both grammars ============

/// Characters `ws` skips; no other whitespace separates tokens
const WHITESPACE: [char; 4] = [' ', '\t', '\r', '\n'];

fn ws(input: &mut &str) -> PResult<()> {
    multispace0.void().parse_next(input)
}

fn ws1(input: &mut &str) -> PResult<()> {
    multispace1.void().parse_next(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident(input: &mut &str) -> PResult<String> {
    (one_of(is_ident_start), take_while(0.., is_ident_char))
        .take()
        .map(str::to_owned)
        .parse_next(input)
}

/// A reserved word, not followed by further identifier characters
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    terminated(word, not(one_of(is_ident_char)))
}

/// Finite decimal number: `-1`, `2.5`, `+3e-2`
fn number(input: &mut &str) -> PResult<f64> {
    (
        opt(one_of(['+', '-'])),
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .verify(|v: &f64| v.is_finite())
        .parse_next(input)
}

fn unsigned(input: &mut &str) -> PResult<usize> {
    digit1
        .try_map(|s: &str| s.parse::<usize>())
        .parse_next(input)
}

/// Double-quoted string with escapes `\" \\ \n \t \r \0 \xHH`
fn string_lit(input: &mut &str) -> PResult<String> {
    delimited('"', repeat(0.., string_char), '"').parse_next(input)
}

fn string_char(input: &mut &str) -> PResult<char> {
    alt((preceded('\\', escape_seq), none_of(['"', '\\']))).parse_next(input)
}

fn escape_seq(input: &mut &str) -> PResult<char> {
    alt((
        '"'.value('"'),
        '\\'.value('\\'),
        'n'.value('\n'),
        't'.value('\t'),
        'r'.value('\r'),
        '0'.value('\0'),
        preceded('x', take_while(2, |c: char| c.is_ascii_hexdigit())).verify_map(|hex: &str| {
            u8::from_str_radix(hex, 16)
                .ok()
                .filter(u8::is_ascii)
                .map(char::from)
        }),
    ))
    .parse_next(input)
}
