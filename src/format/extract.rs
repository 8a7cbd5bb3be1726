//! The simple extractor: keep everything from the first `(` to the last `)`.

use super::template::extract_wrapper;

/// The text from the first `(` to the last `)`, inclusive.
///
/// Returns None if either is missing.
/// If the last `)` comes before the first `(`, the slice is empty.
pub fn bracketed(content: &str) -> Option<&str> {
    let first = content.find('(')?;
    let last = content.rfind(')')?;
    Some(if first < last { &content[first..=last] } else { "" })
}

/// Wrap the bracketed part of `content` as the `c:code` command.
pub fn extract(content: &str) -> Option<String> {
    let slice = bracketed(content)?;
    tracing::debug!(len = slice.len(), "extracted bracketed source");
    Some(extract_wrapper(slice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_verbatim() {
        let content = "Here is your code:\n(setq pt (getpoint))\n(command \"line\" pt)\nEnjoy!";
        assert_eq!(
            bracketed(content),
            Some("(setq pt (getpoint))\n(command \"line\" pt)")
        );
    }

    #[test]
    fn wrapper_embeds_slice() {
        assert_eq!(
            extract("```lisp\n(princ \"hi\")\n```").as_deref(),
            Some(r#"(defun *error* (msg) (setvar "osmode" old_osmode))(defun c:code ()(princ "hi"))"#)
        );
    }

    #[test]
    fn missing_brackets() {
        for content in ["", "no lisp here", "only (open", "only close)"] {
            assert_eq!(extract(content), None, "{content:?}");
        }
    }

    #[test]
    fn close_before_open_is_empty() {
        assert_eq!(bracketed("a) b (c"), Some(""));
        assert_eq!(
            extract("a) b (c").as_deref(),
            Some(r#"(defun *error* (msg) (setvar "osmode" old_osmode))(defun c:code ())"#)
        );
    }
}
