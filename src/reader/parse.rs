//! Turn a token stream into expressions.
//!
//! The S-expression layer of syntax is context-free, so it can be parsed "with a stack":
//! LParen pushes a new frame of expressions,
//! RParen pops the top frame and inserts it as a List into the frame below.
//! A quote pushes a frame that closes as soon as it receives one expression.

use crate::data::{Expr, ExprKind};

use super::{
    token::{Token, TokenOffset},
    ReadErr, ReadResult,
};

enum Frame {
    List { start: usize, items: Vec<Expr> },
    Quote { start: usize },
}

#[derive(Default)]
struct Parser {
    // A stack of incomplete expressions, by depth.
    stack: Vec<Frame>,
    // Completed top-level expressions.
    results: Vec<Expr>,
}

impl Parser {
    /// Add a completed expression to the innermost open frame, closing any quotes it completes.
    fn push(&mut self, mut expr: Expr) {
        loop {
            match self.stack.last_mut() {
                None => {
                    self.results.push(expr);
                    return;
                }
                Some(Frame::List { items, .. }) => {
                    items.push(expr);
                    return;
                }
                Some(Frame::Quote { start }) => {
                    let span = *start..expr.span.end;
                    self.stack.pop();
                    expr = Expr::new(ExprKind::Quote(Box::new(expr)), span);
                }
            }
        }
    }

    /// Handle a single token.
    /// Returns an error if the token cannot close anything.
    fn token(&mut self, offset: TokenOffset) -> ReadResult<()> {
        let TokenOffset {
            token,
            line,
            column,
            span,
        } = offset;
        match token {
            Token::LParen => self.stack.push(Frame::List {
                start: span.start,
                items: Vec::new(),
            }),
            Token::Quote => self.stack.push(Frame::Quote { start: span.start }),
            Token::Symbol(s) => self.push(Expr::new(ExprKind::Symbol(s), span)),
            Token::String(s) => self.push(Expr::new(ExprKind::String(s), span)),
            Token::RParen => match self.stack.pop() {
                Some(Frame::List { start, items }) => {
                    self.push(Expr::new(ExprKind::List(items), start..span.end))
                }
                Some(Frame::Quote { .. }) => {
                    return Err(ReadErr::Error(format!(
                        "parse error: quote with nothing to quote before right paren (line {}, column {})",
                        line, column
                    )))
                }
                None => {
                    // An unbalanced paren!
                    // That's not just an amount-of-input error; it's a semantic error.
                    return Err(ReadErr::Error(format!(
                        "parse error: encountered right paren (line {}, column {}) without matching left paren",
                        line, column
                    )));
                }
            },
        }
        Ok(())
    }
}

/// Parse all tokens as complete expressions.
pub fn parse(tokens: impl Iterator<Item = TokenOffset>) -> ReadResult<Vec<Expr>> {
    let mut parser = Parser::default();
    for token in tokens {
        parser.token(token)?;
    }

    if !parser.stack.is_empty() {
        return Err(ReadErr::Incomplete(format!(
            "parse error: got end of input within an expression of depth {}",
            parser.stack.len(),
        )));
    }
    Ok(parser.results)
}

/// Parse as many expressions as possible, never failing.
///
/// Lists still open at the end of input are returned as open lists.
pub fn parse_fragments(tokens: impl Iterator<Item = TokenOffset>) -> Vec<Expr> {
    let mut parser = Parser::default();
    for token in tokens {
        if token.token == Token::RParen {
            // A right paren closes any dangling quotes first; with nothing left to close, skip it.
            while let Some(Frame::Quote { .. }) = parser.stack.last() {
                parser.stack.pop();
            }
            if parser.stack.is_empty() {
                continue;
            }
        }
        // Only RParen can fail, and we just made sure it has a list to close.
        let _ = parser.token(token);
    }

    // Close whatever is still open, innermost first, so each open list lands in its parent.
    // A quote with nothing after it is dropped.
    while let Some(frame) = parser.stack.pop() {
        if let Frame::List { start, items } = frame {
            let end = items.last().map_or(start + 1, |item| item.span.end);
            parser.push(Expr::open_list(items, start..end));
        }
    }
    parser.results
}

#[cfg(test)]
mod tests {
    use super::super::token::tokenize;
    use super::*;
    use crate::reader::{read, read_fragments};

    #[test]
    fn parse_several_atoms() -> ReadResult<()> {
        let got = read("1 pt \"two\"")?;
        let printed: Vec<String> = got.iter().map(|e| e.to_string()).collect();
        assert_eq!(printed, vec!["1", "pt", "\"two\""]);
        Ok(())
    }

    #[test]
    fn parse_tree() -> ReadResult<()> {
        let input = "(defun c:test ( / pt) (setq pt (getpoint \"pick\")) '(1 . 2))";
        let got = read(input)?;
        assert_eq!(got.len(), 1);
        let defun = &got[0];
        assert_eq!(defun.span, 0..input.len());
        let args = defun.args_of("defun").unwrap();
        assert!(args[0].is_symbol("C:TEST"));
        assert_eq!(args[1].to_string(), "(/ pt)");
        assert_eq!(&input[args[2].span.clone()], "(setq pt (getpoint \"pick\"))");
        match &args[3].kind {
            ExprKind::Quote(inner) => assert_eq!(inner.to_string(), "(1 . 2)"),
            v => panic!("expected quote, got {v:?}"),
        }
        assert_eq!(&input[args[3].span.clone()], "'(1 . 2)");
        Ok(())
    }

    #[test]
    fn want_more_on_unbalanced() {
        match read("(incomplete keep going") {
            Ok(_) => panic!("expected error for input"),
            Err(ReadErr::Error(e)) => panic!(
                "got terminal error, expected incomplete error; got: {:?}",
                e
            ),
            Err(ReadErr::Incomplete(_)) => (),
        }
    }

    #[test]
    fn error_on_extra_right_paren() {
        match read("(princ))") {
            Err(ReadErr::Error(e)) => assert!(e.contains("column 8"), "{e}"),
            v => panic!("expected terminal error, got {v:?}"),
        }
    }

    #[test]
    fn error_on_empty_quote() {
        assert!(matches!(read("(list ')"), Err(ReadErr::Error(_))));
    }

    #[test]
    fn multi_line_ok() -> ReadResult<()> {
        let input = r#"(
            start
"and
keep"
            going
        )

        "#;
        let got = read(input)?;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].to_string(), "(start \"and\nkeep\" going)");
        Ok(())
    }

    #[test]
    fn fragments_keep_open_lists() {
        let got = read_fragments("(while (setq pt (getpoint \"next\"))");
        assert_eq!(got.len(), 1);
        assert!(got[0].open);
        let args = got[0].args_of("while").unwrap();
        assert!(args[0].is_call("setq"));
        assert!(!args[0].open);
    }

    #[test]
    fn fragments_nest_open_lists() {
        let input = "(defun c:x ()\n  (command \"_.line\"";
        let got = read_fragments(input);
        assert_eq!(got.len(), 1);
        let args = got[0].args_of("defun").unwrap();
        let command = &args[2];
        assert!(command.open);
        assert!(command.is_call("command"));
        assert_eq!(&input[command.span.clone()], "(command \"_.line\"");
        assert_eq!(got[0].span.end, input.len());
    }

    #[test]
    fn fragments_skip_stray_parens() {
        let got = read_fragments("  ) (command \"line\" pt) ))");
        assert_eq!(got.len(), 1);
        assert!(got[0].is_call("command"));
    }

    #[test]
    fn fragments_stop_at_open_string() {
        let got = read_fragments(r#"(princ "done") (princ "not done"#);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].to_string(), "(princ \"done\")");
        assert!(got[1].open);
        assert!(got[1].is_call("princ"));
    }

    #[test]
    fn fragments_drop_dangling_quote() {
        let tokens = tokenize("(foo ')").unwrap();
        let got = parse_fragments(tokens.into_iter());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].to_string(), "(foo)");
    }
}
