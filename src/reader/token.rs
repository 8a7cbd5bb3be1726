//! Module for extracting AutoLISP tokens from source text.

use crate::data::Span;
use crate::reader::{ReadErr, ReadResult};

/// A Lisp token.
///
/// Whitespace and comments are ignored.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    /// Literal text between the quotes, escapes untouched.
    String(String),
    /// Any other atom: symbols, numbers, the dot of a dotted pair.
    Symbol(String),
}

/// A token along with its position in the input.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TokenOffset {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

/// Split the input into its constituent tokens.
pub fn tokenize(input: &str) -> ReadResult<Vec<TokenOffset>> {
    let (tokens, err) = tokenize_partial(input);
    match err {
        Some(err) => Err(err),
        None => Ok(tokens),
    }
}

/// Split the input into tokens, stopping at the first error.
///
/// Returns every token read before the error, along with the error itself (if any).
pub fn tokenize_partial(input: &str) -> (Vec<TokenOffset>, Option<ReadErr>) {
    let mut result = Vec::new();

    // Line number and column, starting from 0 - fixed up when doing output.
    let mut line = 0;
    let mut column = 0;
    let mut offset = 0;
    while offset < input.len() {
        let next = match get_next_token(&input[offset..]) {
            Ok(next) => next,
            Err(err) => {
                let err = err.annotate(format!("at line {} column {}", line + 1, column + 1));
                return (result, Some(err));
            }
        };

        if let Some(token) = next.token {
            tracing::trace!(?token, line = line + 1, column = column + 1, "token");
            result.push(TokenOffset::new(
                line,
                column,
                offset..offset + next.length,
                token,
            ));
        }
        line += next.lines;
        if next.lines > 0 {
            column = next.columns
        } else {
            column += next.columns;
        }

        offset += next.length;
    }

    (result, None)
}

impl TokenOffset {
    fn new(line: usize, column: usize, span: Span, token: Token) -> Self {
        // In useful output, lines and columns are 1-indexed
        TokenOffset {
            token,
            line: line + 1,
            column: column + 1,
            span,
        }
    }
}

impl From<TokenOffset> for Token {
    fn from(value: TokenOffset) -> Self {
        value.token
    }
}

struct NextToken {
    // Token retrieved, if any.
    // None if only whitespace or a comment was consumed.
    token: Option<Token>,
    // Lines traversed in finding the token.
    lines: usize,
    // Columns in the final line traversed in finding the token.
    columns: usize,
    // Bytes consumed.
    length: usize,
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn space() -> &'static Regex {
        static SPACE: OnceLock<Regex> = OnceLock::new();
        SPACE.get_or_init(|| {
            Regex::new(r"\A\s+").expect("could not compile regex for empty space")
        })
    }

    pub(super) fn string() -> &'static Regex {
        static STRING: OnceLock<Regex> = OnceLock::new();
        STRING.get_or_init(|| {
            // Quote, followed by any number of:
            //  - a backslash + character (an escaped character, of any sort), or
            //  - any character other than a quote or backslash
            // We do _not_ require the trailing quote; we check that after consuming the
            // regex, so we can return "incomplete" if we haven't closed the quote.
            Regex::new(r#"(?s)\A"(\\.|[^"\\])*"#).expect("could not compile regex for string")
        })
    }

    pub(super) fn symbol() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r#"\A[^;\s'()"]+"#).expect("could not compile regex for symbol")
        })
    }

    pub(super) fn comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| Regex::new(r"\A;.*").expect("could not compile regex for comment"))
    }

    pub(super) fn block_comment() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            Regex::new(r"(?s)\A;\|.*?\|;").expect("could not compile regex for block comment")
        })
    }
}

/// Returns the (line, column) that the cursor ends at, after following the given text,
/// assuming it started at (0, 0).
/// Tabs still count as a single column.
fn cursor_distance(s: &str) -> (usize, usize) {
    let line_count = s.matches('\n').count();
    let last_line = match s.rfind('\n') {
        Some(i) => &s[i + 1..],
        None => s,
    };
    (line_count, last_line.chars().count())
}

/// Get the next token from the input.
fn get_next_token(input: &str) -> ReadResult<NextToken> {
    // Shouldn't bother calling if the remainder is empty.
    assert!(!input.is_empty());

    // Single-character matchers:
    if let Some(token) = match input.as_bytes()[0] {
        b'(' => Some(Token::LParen),
        b')' => Some(Token::RParen),
        b'\'' => Some(Token::Quote),
        _ => None,
    } {
        return Ok(NextToken {
            token: Some(token),
            lines: 0,
            columns: 1,
            length: 1,
        });
    };

    // Regex matchers:
    let skip = |s: &str| {
        let (lines, columns) = cursor_distance(s);
        NextToken {
            token: None,
            lines,
            columns,
            length: s.len(),
        }
    };
    if let Some(space) = regex::space().find(input) {
        return Ok(skip(space.as_str()));
    }
    if input.starts_with(";|") {
        return match regex::block_comment().find(input) {
            Some(s) => Ok(skip(s.as_str())),
            None => Err(ReadErr::Incomplete("incomplete block comment".to_owned())),
        };
    }
    if let Some(s) = regex::comment().find(input) {
        return Ok(skip(s.as_str()));
    }

    if let Some(s) = regex::string().find(input) {
        let body = s.as_str();
        if !input[body.len()..].starts_with('"') {
            // No closing quote; consider this a premature end.
            return Err(ReadErr::Incomplete("incomplete string".to_owned()));
        }
        let full = &input[..body.len() + 1];
        let (lines, columns) = cursor_distance(full);
        return Ok(NextToken {
            token: Some(Token::String(body[1..].to_owned())),
            lines,
            columns,
            length: full.len(),
        });
    }

    if let Some(s) = regex::symbol().find(input) {
        let s = s.as_str();
        // Case is preserved here; comparisons fold it later.
        return Ok(NextToken {
            token: Some(Token::Symbol(s.to_owned())),
            lines: 0,
            columns: s.chars().count(),
            length: s.len(),
        });
    }

    Err(ReadErr::Error(
        "could not parse remainder of input as anything".to_owned(),
    ))
}
