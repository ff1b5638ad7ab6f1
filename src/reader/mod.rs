//! Support for reading Lisp expressions from strings.

use std::iter::Peekable;

use crate::data::{Symbol, Value};
use crate::error::{Error, Result};
use crate::eval::Keywords;

pub use token::{tokenize, TokenOffset};

mod token;

/// Parse the text as a program: its forms wrapped in a single grouping form.
///
/// With the standard keywords, `(def x 1) (print x)` reads as `(do (def x 1) (print x))`,
/// and an empty program as `(do)`.
pub fn parse_program(keywords: &Keywords, input: &str) -> Result<Value> {
    let body = tokenize(input);
    check_closing_parens(&body)?;

    // The wrapper tokens point at the start and end of the input.
    let (end_line, end_column) = body
        .last()
        .map(|t| (t.line, t.column + t.token.chars().count()))
        .unwrap_or((1, 1));
    let mut tokens = Vec::with_capacity(body.len() + 3);
    tokens.push(TokenOffset::new("(", 1, 1));
    tokens.push(TokenOffset::new(keywords.grouping(), 1, 1));
    tokens.extend(body);
    tokens.push(TokenOffset::new(")", end_line, end_column));

    let mut tokens = tokens.into_iter().peekable();
    read(keywords, &mut tokens)
}

/// Fail at the first `)` that closes nothing.
///
/// Without this, such a paren would close the wrapper list early,
/// and the reader would stop there with input left over.
fn check_closing_parens(tokens: &[TokenOffset]) -> Result<()> {
    let mut depth = 0usize;
    for t in tokens {
        match t.token.as_str() {
            "(" => depth += 1,
            ")" => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::Syntax("unmatched right paren".to_owned()).annotate(t.position())
                })?
            }
            _ => (),
        }
    }
    Ok(())
}

/// Read a single expression from the front of the token stream.
pub fn read<I>(keywords: &Keywords, tokens: &mut Peekable<I>) -> Result<Value>
where
    I: Iterator<Item = TokenOffset>,
{
    let Some(t) = tokens.next() else {
        return Err(Error::Syntax("EOF while reading".to_owned()));
    };

    match t.token.as_str() {
        "(" => {
            let mut list = Vec::new();
            loop {
                match tokens.peek() {
                    Some(next) if next.token == ")" => {
                        tokens.next();
                        return Ok(Value::List(list.into()));
                    }
                    Some(_) => list.push(read(keywords, tokens)?),
                    None => {
                        return Err(Error::Syntax(format!(
                            "EOF while reading list started {}",
                            t.position()
                        )))
                    }
                }
            }
        }
        ")" => Err(Error::Syntax("unmatched right paren".to_owned()).annotate(t.position())),
        _ => atom(keywords, &t.token).map_err(|e| e.annotate(t.position())),
    }
}

/// Classify a non-parenthesis token.
fn atom(keywords: &Keywords, token: &str) -> Result<Value> {
    if regex::integer().is_match(token) {
        let i = token.parse().map_err(|e| {
            Error::Lexical(format!("failed to convert {token:?} into integer: {e}"))
        })?;
        Ok(Value::Integer(i))
    } else if regex::string().is_match(token) {
        let content = &token[1..token.len() - 1];
        Ok(Value::Text(unescape(content)?.into()))
    } else if token == "true" {
        Ok(Value::Boolean(true))
    } else if token == "false" {
        Ok(Value::Boolean(false))
    } else if regex::symbol().is_match(token) || keywords.contains_name(token) {
        Ok(Value::Symbol(Symbol::new(token)))
    } else if token.starts_with('"') {
        match closing_quote(token) {
            Some(end) => Err(Error::Lexical(format!(
                "unexpected {:?} after string literal: {token}",
                &token[end + 1..]
            ))),
            None => Err(Error::Lexical(format!("unterminated string literal: {token}"))),
        }
    } else {
        Err(Error::Lexical(format!("invalid token: {token}")))
    }
}

/// Byte index of the quote closing the string that opens the token, if any.
fn closing_quote(token: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in token.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => (),
        }
    }
    None
}

/// Resolve backslash escapes in the body of a string literal.
fn unescape(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('n') => '\n',
            Some('t') => '\t',
            Some('x') => {
                let digits: String = chars.by_ref().take(2).collect();
                Some(&digits)
                    .filter(|d| d.len() == 2 && d.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|d| u8::from_str_radix(d, 16).ok())
                    .map(char::from)
                    .ok_or_else(|| {
                        Error::Lexical(format!("invalid escape sequence '\\x{digits}'"))
                    })?
            }
            Some(other) => {
                return Err(Error::Lexical(format!(
                    "invalid escape sequence '\\{other}'"
                )))
            }
            None => return Err(Error::Lexical("invalid escape sequence '\\'".to_owned())),
        };
        result.push(escaped);
    }
    Ok(result)
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn integer() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A-?[0-9]+\z").expect("could not compile regex for integer")
        })
    }

    pub(super) fn string() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        // Wrapped in quotes; anything (including newlines) in between.
        MATCH.get_or_init(|| {
            Regex::new(r#"(?s)\A".*"\z"#).expect("could not compile regex for string")
        })
    }

    pub(super) fn symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"\A[A-Za-z0-9_+-]+\z").expect("could not compile regex for symbol")
        })
    }
}
