//! Support for reading AutoLISP expressions from strings.

use crate::data::Expr;
use parse::{parse, parse_fragments};
use token::{tokenize, tokenize_partial};

mod parse;
mod token;

/// Read the string as a sequence of complete Lisp expressions.
///
/// An unbalanced right paren is an error; an unterminated list, string,
/// or block comment is incomplete.
pub fn read(input: &str) -> ReadResult<Vec<Expr>> {
    let tokens = tokenize(input)?;
    parse(tokens.into_iter())
}

/// Read whatever complete expressions can be found in the string.
///
/// This is meant for programs that may be cut off or carry extra closing parens.
/// Stray right parens are skipped and reading stops at an unterminated string.
/// A list left open at the end is returned with the items read so far and `open` set.
pub fn read_fragments(input: &str) -> Vec<Expr> {
    let (tokens, err) = tokenize_partial(input);
    if let Some(err) = err {
        tracing::trace!(%err, "stopped reading fragments early");
    }
    parse_fragments(tokens.into_iter())
}

/// Error type if a read does not complete.
///
/// A reader may experience a true tokenizing/parsing error, e.g. "())", that no additional input can fix.
/// This is distinct from a reader that gets an unexpected end-of-input, e.g. "(()":
/// it may be that more input will fix the issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadErr {
    Error(String),
    Incomplete(String),
}

impl std::fmt::Display for ReadErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        match self {
            ReadErr::Error(e) => write!(f, "error in input: {e}"),
            ReadErr::Incomplete(e) => write!(f, "incomplete input: {e}"),
        }
    }
}

impl std::error::Error for ReadErr {}

impl ReadErr {
    /// Add additional context to an error.
    pub fn annotate(self, more: impl AsRef<str>) -> Self {
        match self {
            ReadErr::Error(e) => ReadErr::Error(format!("{}: {}", more.as_ref(), e)),
            ReadErr::Incomplete(e) => ReadErr::Incomplete(format!("{}: {}", more.as_ref(), e)),
        }
    }
}

/// The main result type for this module:
/// a T (token, expression, etc), or an error, or incomplete.
pub type ReadResult<T> = Result<T, ReadErr>;
