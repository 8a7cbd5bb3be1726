//! The expression tree produced by the reader.
//!
//! This is deliberately small: AutoLISP fragments only need to be *recognized*,
//! never evaluated, so numbers and dotted pairs stay as plain atoms.
//! Each node remembers the byte range of the source it was read from,
//! which lets callers splice the original text instead of re-printing it.
//!
//! The Display implementation renders the expression back as Lisp.

use std::fmt;
use std::ops::Range;

/// Byte range into the text an expression was read from.
pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// A list whose closing paren was never read.
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Any atom that is not a string: symbols, numbers, `.`.
    Symbol(String),
    /// The literal text between the quotes. Escape sequences are left as written.
    String(String),
    Quote(Box<Expr>),
    List(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            open: false,
        }
    }

    /// A list cut off by the end of input, holding the items read so far.
    pub fn open_list(items: Vec<Expr>, span: Span) -> Self {
        Expr {
            kind: ExprKind::List(items),
            span,
            open: true,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Symbol comparison. AutoLISP folds symbol case, so we do too.
    pub fn is_symbol(&self, name: &str) -> bool {
        self.as_symbol()
            .is_some_and(|s| s.eq_ignore_ascii_case(name))
    }

    /// If this is a list headed by a symbol, returns that symbol and the remaining elements.
    pub fn call(&self) -> Option<(&str, &[Expr])> {
        let (head, args) = self.as_list()?.split_first()?;
        Some((head.as_symbol()?, args))
    }

    /// The arguments of this expression, if it is a call to `name`.
    pub fn args_of(&self, name: &str) -> Option<&[Expr]> {
        self.call()
            .filter(|(head, _)| head.eq_ignore_ascii_case(name))
            .map(|(_, args)| args)
    }

    pub fn is_call(&self, name: &str) -> bool {
        self.args_of(name).is_some()
    }

    /// Pre-order search of this expression and its sub-expressions.
    ///
    /// Quoted data is not code, so the search does not descend into it.
    pub fn any<F>(&self, pred: &F) -> bool
    where
        F: Fn(&Expr) -> bool,
    {
        if pred(self) {
            return true;
        }
        match &self.kind {
            ExprKind::List(items) => items.iter().any(|item| item.any(pred)),
            _ => false,
        }
    }

    /// Calls `f` on this expression and every sub-expression, pre-order.
    ///
    /// Pre-order is also source order: each expression starts after the ones visited before it.
    /// Quoted data is not descended into.
    pub fn visit<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Expr),
    {
        f(self);
        if let ExprKind::List(items) = &self.kind {
            for item in items {
                item.visit(f);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Symbol(s) => write!(f, "{s}"),
            ExprKind::String(s) => write!(f, "\"{s}\""),
            ExprKind::Quote(inner) => write!(f, "'{inner}"),
            ExprKind::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                if self.open {
                    Ok(())
                } else {
                    write!(f, ")")
                }
            }
        }
    }
}
