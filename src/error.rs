//! Errors from reading or evaluating a program.

use std::io::ErrorKind;

/// Error type for a failed parse or evaluation.
///
/// Every error is fatal: nothing inside the reader or evaluator catches one.
/// The variant tells which stage rejected the program;
/// the string is a human-readable description, naming the offending token or symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A token that is not any known literal form, or a bad escape in a string.
    Lexical(String),
    /// Unbalanced parentheses, or input ending in the middle of an expression.
    Syntax(String),
    /// A symbol that is not bound anywhere in the environment chain.
    Name(String),
    /// A value of the wrong kind, e.g. calling something that is not a procedure.
    Type(String),
    /// A procedure or keyword received the wrong number of arguments.
    Arity(String),
    /// Integer overflow or division by zero.
    Arithmetic(String),
    /// Writing program output failed.
    Io(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        match self {
            Error::Lexical(e) => write!(f, "lexical error: {e}"),
            Error::Syntax(e) => write!(f, "syntax error: {e}"),
            Error::Name(e) => write!(f, "name error: {e}"),
            Error::Type(e) => write!(f, "type error: {e}"),
            Error::Arity(e) => write!(f, "arity error: {e}"),
            Error::Arithmetic(e) => write!(f, "arithmetic error: {e}"),
            Error::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Add additional context to an error.
    pub fn annotate(self, more: impl AsRef<str>) -> Self {
        let more = more.as_ref();
        match self {
            Error::Lexical(e) => Error::Lexical(format!("{more}: {e}")),
            Error::Syntax(e) => Error::Syntax(format!("{more}: {e}")),
            Error::Name(e) => Error::Name(format!("{more}: {e}")),
            Error::Type(e) => Error::Type(format!("{more}: {e}")),
            Error::Arity(e) => Error::Arity(format!("{more}: {e}")),
            Error::Arithmetic(e) => Error::Arithmetic(format!("{more}: {e}")),
            Error::Io(e) => Error::Io(format!("{more}: {e}")),
        }
    }
}

/// The main result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<Error> for std::io::Error {
    fn from(value: Error) -> Self {
        match value {
            Error::Io(s) => std::io::Error::new(ErrorKind::Other, s),
            e => std::io::Error::new(ErrorKind::InvalidInput, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_keeps_kind() {
        let e = Error::Syntax("unmatched right paren".to_owned()).annotate("at line 2 column 5");
        match &e {
            Error::Syntax(s) => assert_eq!(s, "at line 2 column 5: unmatched right paren"),
            v => panic!("unexpected error: {v:?}"),
        }
        assert_eq!(
            e.to_string(),
            "syntax error: at line 2 column 5: unmatched right paren"
        );
    }

    #[test]
    fn into_io_error() {
        let e: std::io::Error = Error::Name("value not found for symbol: x".to_owned()).into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert!(e.to_string().contains("x"), "missing symbol: {e}");
    }
}
