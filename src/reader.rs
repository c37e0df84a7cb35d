//! The s-expression reader.
//!
//! Parsing happens in two stages, grounded in the nom-combinator style of this interpreter's
//! lineage but adapted to a heap that needs `&mut` access: stage one uses `nom` to build a small,
//! unrooted intermediate tree (`Sexpr`) from the source text with no heap involved at all; stage
//! two walks that tree bottom-up, allocating each node onto the heap. This avoids threading a
//! mutable heap borrow through recursive `nom` combinators.

use nom::{
    branch::alt,
    bytes::complete::{escaped, take_while, take_while1},
    character::complete::{char, one_of, satisfy},
    combinator::map,
    IResult, Parser,
};

use crate::error::LispError;
use crate::heap::{Heap, ValueRef};
use crate::value;

/// An unrooted, heap-free parse tree. Built by the `nom` stage, consumed by the allocation stage.
#[derive(Debug, Clone, PartialEq)]
enum Sexpr {
    Integer(i64),
    Decimal(f64),
    Symbol(String),
    String(String),
    /// A list's elements plus an optional dotted tail (`(a b . c)`).
    List(Vec<Sexpr>, Option<Box<Sexpr>>),
    Quote(Box<Sexpr>),
}

fn is_atom_boundary(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')' || c == '\''
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn skip_ws(input: &str) -> IResult<&str, ()> {
    let mut rest = input;
    loop {
        let (r, _) = take_while::<_, _, nom::error::Error<&str>>(char::is_whitespace)(rest)?;
        rest = r;
        if let Ok((r, _)) = line_comment(rest) {
            rest = r;
            continue;
        }
        break;
    }
    Ok((rest, ()))
}

fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_dot_separator(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some('.') => chars.next().map_or(true, is_atom_boundary),
        _ => false,
    }
}

/// An atom token is any run of non-boundary characters, classified afterward as integer, decimal,
/// or symbol per the grammar in the specification.
fn atom_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !is_atom_boundary(c))(input)
}

fn parse_atom(input: &str) -> IResult<&str, Sexpr> {
    map(atom_token, |token: &str| {
        if is_integer_token(token) {
            Sexpr::Integer(token.parse().unwrap_or(0))
        } else if token.contains('.') {
            match token.parse::<f64>() {
                Ok(n) => Sexpr::Decimal(n),
                Err(_) => Sexpr::Symbol(token.to_string()),
            }
        } else {
            Sexpr::Symbol(token.to_string())
        }
    })
    .parse(input)
}

fn parse_string(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<&str>>('"').parse(input) {
        return Ok((input, Sexpr::String(String::new())));
    }
    let (input, content) = escaped(
        satisfy(|c| c != '"' && c != '\\'),
        '\\',
        one_of("\"\\"),
    )
    .parse(input)?;
    let (input, _) = char('"')(input)?;

    let mut out = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped_char) = chars.next() {
                out.push(escaped_char);
            }
        } else {
            out.push(c);
        }
    }
    Ok((input, Sexpr::String(out)))
}

fn parse_quote(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, Sexpr::Quote(Box::new(expr))))
}

fn parse_list(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = char('(')(input)?;
    let (input, _) = skip_ws(input)?;
    let mut items = Vec::new();
    let mut rest = input;
    loop {
        if let Ok((r, _)) = char::<_, nom::error::Error<&str>>(')').parse(rest) {
            return Ok((r, Sexpr::List(items, None)));
        }
        if is_dot_separator(rest) {
            let (r, _) = char::<_, nom::error::Error<&str>>('.').parse(rest)?;
            let (r, tail) = parse_expr(r)?;
            let (r, _) = skip_ws(r)?;
            let (r, _) = char(')')(r)?;
            return Ok((r, Sexpr::List(items, Some(Box::new(tail)))));
        }
        let (r, item) = parse_expr(rest)?;
        items.push(item);
        let (r, _) = skip_ws(r)?;
        rest = r;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = skip_ws(input)?;
    alt((parse_quote, parse_list, parse_string, parse_atom)).parse(input)
}

/// Allocates an `Sexpr` tree onto the heap bottom-up, producing the `ValueRef` the reader returns.
fn allocate(heap: &mut Heap, tree: &Sexpr) -> Result<ValueRef, LispError> {
    match tree {
        Sexpr::Integer(n) => value::make_int(heap, *n),
        Sexpr::Decimal(n) => value::make_decimal(heap, *n),
        Sexpr::Symbol(s) => value::make_symbol(heap, s),
        Sexpr::String(s) => value::make_string(heap, s),
        Sexpr::Quote(inner) => {
            let quote_sym = value::make_symbol(heap, "quote")?;
            let inner_ref = allocate(heap, inner)?;
            let tail = value::cons(heap, inner_ref, ValueRef::NIL)?;
            value::cons(heap, quote_sym, tail)
        }
        Sexpr::List(items, tail) => {
            let mut list = match tail {
                Some(t) => allocate(heap, t)?,
                None => ValueRef::NIL,
            };
            for item in items.iter().rev() {
                let item_ref = allocate(heap, item)?;
                list = value::cons(heap, item_ref, list)?;
            }
            Ok(list)
        }
    }
}

/// Reads one expression from `text`, starting at byte offset 0. Advances `offset` to the number
/// of bytes consumed (including any leading whitespace/comments) so the caller can iterate
/// top-level forms by slicing `text[*offset..]` on the next call. Returns a `SyntaxError` on
/// mismatched parens, unterminated strings, or malformed dotted pairs.
pub fn read_exp(heap: &mut Heap, text: &str, offset: &mut usize) -> Result<ValueRef, LispError> {
    match parse_expr(text) {
        Ok((rest, tree)) => {
            *offset = text.len() - rest.len();
            allocate(heap, &tree)
        }
        Err(_) => {
            *offset = text.len();
            Err(LispError::syntax(format!(
                "could not read an expression from: {text:?}"
            )))
        }
    }
}

/// Reads every top-level expression in `text` in order.
pub fn read_all(heap: &mut Heap, text: &str) -> Result<Vec<ValueRef>, LispError> {
    let mut exprs = Vec::new();
    let mut rest = text;
    loop {
        let (after_ws, _) = skip_ws(rest).unwrap_or((rest, ()));
        if after_ws.is_empty() {
            break;
        }
        let mut consumed = 0usize;
        let expr = read_exp(heap, after_ws, &mut consumed)?;
        exprs.push(expr);
        rest = &after_ws[consumed..];
    }
    Ok(exprs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use crate::value::Value;

    fn heap() -> Heap {
        Heap::new(1 << 20, 1 << 20, Verbosity::Silent)
    }

    #[test]
    fn reads_integer() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "42", &mut off).unwrap();
        assert_eq!(h.deref(v), &Value::Integer(42));
        assert_eq!(off, 2);
    }

    #[test]
    fn reads_negative_integer() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "-7", &mut off).unwrap();
        assert_eq!(h.deref(v), &Value::Integer(-7));
    }

    #[test]
    fn reads_decimal() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "3.5", &mut off).unwrap();
        assert_eq!(h.deref(v), &Value::Decimal(3.5));
    }

    #[test]
    fn reads_symbol_with_punctuation() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "->foo?", &mut off).unwrap();
        assert_eq!(h.deref(v), &Value::Symbol("->foo?".to_string()));
    }

    #[test]
    fn reads_string_with_escaped_quote() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, r#""a\"b""#, &mut off).unwrap();
        assert_eq!(h.deref(v), &Value::String("a\"b".to_string()));
    }

    #[test]
    fn reads_proper_list() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "(1 2 3)", &mut off).unwrap();
        assert_eq!(value::list_to_vec(&h, v).unwrap().len(), 3);
    }

    #[test]
    fn reads_dotted_pair() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "(1 . 2)", &mut off).unwrap();
        match h.deref(v) {
            Value::Pair(a, b) => {
                assert_eq!(h.deref(*a), &Value::Integer(1));
                assert_eq!(h.deref(*b), &Value::Integer(2));
            }
            _ => panic!("expected a pair"),
        }
    }

    #[test]
    fn quote_desugars_to_quote_form() {
        let mut h = heap();
        let mut off = 0;
        let v = read_exp(&mut h, "'x", &mut off).unwrap();
        let items = value::list_to_vec(&h, v).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(h.deref(items[0]), &Value::Symbol("quote".to_string()));
        assert_eq!(h.deref(items[1]), &Value::Symbol("x".to_string()));
    }

    #[test]
    fn offset_lets_caller_iterate_top_level_forms() {
        let mut h = heap();
        let mut off = 0;
        let text = "1 2 3";
        let _ = read_exp(&mut h, text, &mut off).unwrap();
        let rest = &text[off..];
        let mut off2 = 0;
        let v2 = read_exp(&mut h, rest.trim_start(), &mut off2).unwrap();
        assert_eq!(h.deref(v2), &Value::Integer(2));
    }

    #[test]
    fn unterminated_paren_is_syntax_error() {
        let mut h = heap();
        let mut off = 0;
        let err = read_exp(&mut h, "(1 2", &mut off).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SyntaxError);
    }

    #[test]
    fn read_all_reads_every_top_level_form() {
        let mut h = heap();
        let vs = read_all(&mut h, "1 2 (+ 1 2)").unwrap();
        assert_eq!(vs.len(), 3);
    }
}
