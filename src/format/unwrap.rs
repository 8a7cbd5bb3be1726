//! Removing the `(defun c:NAME (...) ...)` wrapper from previously generated code.

use std::sync::OnceLock;

use regex::Regex;

use crate::reader::read_fragments;

/// How a previous command wrapper is removed before rewriting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unwrap {
    /// Find the first top-level `defun` of a `c:` command and splice its body into place.
    Structural,
    /// Delete the first `(defun c:NAME (ARGS)` header by pattern and drop one trailing `)`,
    /// then drop another trailing `)` from the rewritten body.
    #[default]
    Legacy,
}

/// Source text with any command wrapper removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    pub text: String,
    pub had_wrapper: bool,
}

impl Unwrap {
    pub fn apply(self, source: &str) -> Unwrapped {
        let unwrapped = match self {
            Unwrap::Structural => structural(source),
            Unwrap::Legacy => legacy(source),
        };
        let unwrapped = unwrapped.unwrap_or_else(|| Unwrapped {
            text: source.to_owned(),
            had_wrapper: false,
        });
        Unwrapped {
            text: unwrapped.text.trim().to_owned(),
            had_wrapper: unwrapped.had_wrapper,
        }
    }

    /// Final adjustment of the rewritten body.
    pub fn finish(self, body: String, had_wrapper: bool) -> String {
        match self {
            Unwrap::Legacy if had_wrapper => strip_one_paren(&body).to_owned(),
            _ => body,
        }
    }
}

fn structural(source: &str) -> Option<Unwrapped> {
    let forms = read_fragments(source);
    forms.iter().find_map(|form| {
        let args = form.args_of("defun")?;
        let name = args.first()?.as_symbol()?;
        let params = args.get(1)?;
        if form.open || !is_command_name(name) || params.as_list().is_none() {
            return None;
        }
        tracing::debug!(name, "removing command wrapper");
        // The form's span ends just past its closing paren.
        let body = &source[params.span.end..form.span.end - 1];
        Some(Unwrapped {
            text: format!(
                "{}{}{}",
                &source[..form.span.start],
                body,
                &source[form.span.end..]
            ),
            had_wrapper: true,
        })
    })
}

fn legacy(source: &str) -> Option<Unwrapped> {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    let header = HEADER.get_or_init(|| {
        Regex::new(r"(?i)\(defun\s+c:[^\s()]*\s*\([^)]*\)")
            .expect("could not compile regex for command header")
    });
    let found = header.find(source)?;
    tracing::debug!(header = found.as_str(), "removing command header");
    let rest = format!("{}{}", &source[..found.start()], &source[found.end()..]);
    Some(Unwrapped {
        text: strip_one_paren(&rest).to_owned(),
        had_wrapper: true,
    })
}

fn is_command_name(name: &str) -> bool {
    name.get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("c:"))
}

/// Drops a single `)` from the end of the text, ignoring trailing whitespace.
fn strip_one_paren(text: &str) -> &str {
    let trimmed = text.trim_end();
    trimmed.strip_suffix(')').unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str = "(defun c:DrawIt ( / pt)\n  (setq pt (getpoint))\n  (command \"line\" pt)\n)\n";

    #[test]
    fn structural_splices_body() {
        let got = Unwrap::Structural.apply(WRAPPED);
        assert!(got.had_wrapper);
        assert_eq!(got.text, "(setq pt (getpoint))\n  (command \"line\" pt)");
    }

    #[test]
    fn structural_keeps_surrounding_forms() {
        let source = "(setq n 1)\n(DEFUN C:X () (princ n))\n(c:x)";
        let got = Unwrap::Structural.apply(source);
        assert!(got.had_wrapper);
        assert_eq!(got.text, "(setq n 1)\n (princ n)\n(c:x)");
    }

    #[test]
    fn structural_ignores_plain_defun() {
        let source = "(defun helper (a) (* a 2))";
        let got = Unwrap::Structural.apply(source);
        assert!(!got.had_wrapper);
        assert_eq!(got.text, source);
    }

    #[test]
    fn structural_ignores_unclosed_wrapper() {
        let source = "(defun c:broken ()\n (princ)";
        let got = Unwrap::Structural.apply(source);
        assert!(!got.had_wrapper);
        assert_eq!(got.text, source);
    }

    #[test]
    fn legacy_strips_header_and_one_paren() {
        let got = Unwrap::Legacy.apply(WRAPPED);
        assert!(got.had_wrapper);
        assert_eq!(got.text, "(setq pt (getpoint))\n  (command \"line\" pt)");
    }

    #[test]
    fn legacy_finish_strips_again() {
        let body = "(setq pt (getpoint))\n(command \"line\" pt)".to_owned();
        assert_eq!(
            Unwrap::Legacy.finish(body.clone(), true),
            "(setq pt (getpoint))\n(command \"line\" pt"
        );
        assert_eq!(Unwrap::Legacy.finish(body.clone(), false), body);
        assert_eq!(Unwrap::Structural.finish(body.clone(), true), body);
    }

    #[test]
    fn default_strips_twice() {
        let unwrap = Unwrap::default();
        let got = unwrap.apply(WRAPPED);
        assert!(got.had_wrapper);
        assert_eq!(
            unwrap.finish(got.text, got.had_wrapper),
            "(setq pt (getpoint))\n  (command \"line\" pt"
        );
    }

    #[test]
    fn no_wrapper_is_trimmed() {
        for mode in [Unwrap::Structural, Unwrap::Legacy] {
            let got = mode.apply("\n  (princ)  \n");
            assert!(!got.had_wrapper);
            assert_eq!(got.text, "(princ)");
        }
    }
}
