//! Line rules that keep object snaps sane around point queries and commands.
//!
//! Interactive point picks want the user's own object snap settings;
//! `command` calls given computed points want snaps off, or the points get pulled
//! onto nearby geometry. The rewriter walks the program one line at a time and
//! inserts the `setvar` needed before each kind of line, skipping any that would be redundant.
//!
//! The whole body is read once (see [`read_fragments`]), and each line is classified
//! by the calls that start on it, so a call continued onto later lines counts
//! where it opens. Rules, in order, first match wins:
//!
//! 1.  A `setq` whose value calls `getpoint`: restore snaps first, unless already restored.
//! 2.  A restore statement, complete on the line: dropped if snaps are already restored.
//! 3.  A clear statement, complete on the line: kept; snaps are now cleared.
//! 4.  A `command` whose first argument is a string other than `"layer"`:
//!     clear snaps first, unless already cleared.

use crate::data::Expr;
use crate::reader::read_fragments;

use super::template::{rewrite_wrapper, CLEAR_OSMODE, RESTORE_OSMODE};
use super::unwrap::Unwrap;

/// The `osmode` statement most recently emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsmodeState {
    /// Nothing emitted yet.
    #[default]
    Unknown,
    /// `(setvar "osmode" old_osmode)`
    Restored,
    /// `(setvar "osmode" 0)`
    Cleared,
}

/// What a line does, as far as object snaps are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    PointQuery,
    Restore,
    Clear,
    Command,
    Other,
}

impl LineKind {
    /// Classify a line on its own.
    pub fn classify(line: &str) -> Self {
        let forms = read_fragments(line);
        LineKind::of(&calls_in(&forms), line.len())
    }

    /// Classify a line from the calls that start on it.
    /// `line_end` is the offset where the line ends, in the text the calls were read from.
    fn of(calls: &[&Expr], line_end: usize) -> Self {
        let starts = |pred: fn(&Expr) -> bool| calls.iter().any(|call| pred(call));
        let closes = |pred: fn(&Expr) -> bool| {
            calls
                .iter()
                .filter(|call| !call.open && call.span.end <= line_end)
                .any(|call| pred(call))
        };

        if starts(is_point_query_assignment) {
            LineKind::PointQuery
        } else if closes(is_restore) {
            LineKind::Restore
        } else if closes(is_clear) {
            LineKind::Clear
        } else if starts(is_snapping_command) {
            LineKind::Command
        } else {
            LineKind::Other
        }
    }
}

/// Every call in the forms, in source order.
fn calls_in(forms: &[Expr]) -> Vec<&Expr> {
    let mut calls = Vec::new();
    for form in forms {
        form.visit(&mut |expr| {
            if expr.call().is_some() {
                calls.push(expr);
            }
        });
    }
    calls
}

/// `(setq var (... (getpoint ...) ...))`
fn is_point_query_assignment(expr: &Expr) -> bool {
    let Some(args) = expr.args_of("setq") else {
        return false;
    };
    args.iter()
        .skip(1)
        .step_by(2)
        .any(|value| value.any(&|e: &Expr| e.is_call("getpoint")))
}

/// `(setvar "osmode" VALUE)`, returning VALUE.
fn osmode_value(expr: &Expr) -> Option<&Expr> {
    match expr.args_of("setvar")? {
        [name, value]
            if name
                .as_string()
                .is_some_and(|name| name.eq_ignore_ascii_case("osmode")) =>
        {
            Some(value)
        }
        _ => None,
    }
}

fn is_restore(expr: &Expr) -> bool {
    osmode_value(expr).is_some_and(|value| value.is_symbol("old_osmode"))
}

fn is_clear(expr: &Expr) -> bool {
    osmode_value(expr).is_some_and(|value| value.as_symbol() == Some("0"))
}

/// `(command "name" ...)` for any command but `layer`, which takes no points.
///
/// AutoLISP command names are case-insensitive, so `"LAYER"` and `"Layer"` are excluded too.
fn is_snapping_command(expr: &Expr) -> bool {
    expr.args_of("command")
        .and_then(|args| args.first())
        .and_then(Expr::as_string)
        .is_some_and(|name| !name.eq_ignore_ascii_case("layer"))
}

/// Applies the line rules, one line at a time.
#[derive(Debug, Default)]
pub struct Rewriter<'a> {
    state: OsmodeState,
    lines: Vec<&'a str>,
}

impl<'a> Rewriter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OsmodeState {
        self.state
    }

    pub fn line(&mut self, line: &'a str, kind: LineKind) {
        match kind {
            LineKind::PointQuery => {
                if self.state != OsmodeState::Restored {
                    tracing::debug!(line, "restoring object snaps before point query");
                    self.lines.push(RESTORE_OSMODE);
                }
                self.lines.push(line);
                self.state = OsmodeState::Restored;
            }
            LineKind::Restore => {
                if self.state == OsmodeState::Restored {
                    tracing::debug!(line, "dropping redundant restore");
                } else {
                    self.lines.push(line);
                    self.state = OsmodeState::Restored;
                }
            }
            LineKind::Clear => {
                self.lines.push(line);
                self.state = OsmodeState::Cleared;
            }
            LineKind::Command => {
                if self.state != OsmodeState::Cleared {
                    tracing::debug!(line, "clearing object snaps before command");
                    self.lines.push(CLEAR_OSMODE);
                    self.state = OsmodeState::Cleared;
                }
                self.lines.push(line);
            }
            LineKind::Other => self.lines.push(line),
        }
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Apply the line rules to a body, without any wrapping.
pub fn rewrite_body(body: &str) -> String {
    let forms = read_fragments(body);
    let mut calls = calls_in(&forms).into_iter().peekable();
    let mut rewriter = Rewriter::new();
    let mut line_start = 0;
    for line in body.split('\n') {
        let line_end = line_start + line.len();
        let mut started = Vec::new();
        while let Some(call) = calls.next_if(|call| call.span.start < line_end) {
            started.push(call);
        }
        rewriter.line(line, LineKind::of(&started, line_end));
        line_start = line_end + 1;
    }
    rewriter.finish()
}

/// Rewrite a program: unwrap, apply the line rules, and wrap it as the `c:code` command.
///
/// Feeding the output back in is not supported: the inserted handler and
/// capture statement are not recognized, so they would be wrapped a second time.
pub fn rewrite(source: &str, unwrap: Unwrap) -> String {
    let unwrapped = unwrap.apply(source);
    let body = rewrite_body(&unwrapped.text);
    let body = unwrap.finish(body, unwrapped.had_wrapper);
    rewrite_wrapper(&body)
}
