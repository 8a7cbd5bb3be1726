//! The fixed AutoLISP boilerplate that every output is wrapped in.

/// Restores object snaps to the value captured when the command started.
pub const RESTORE_OSMODE: &str = r#"(setvar "osmode" old_osmode)"#;

/// Turns object snaps off, so `command` input points land where they are given.
pub const CLEAR_OSMODE: &str = r#"(setvar "osmode" 0)"#;

pub const CAPTURE_OSMODE: &str = r#"(setq old_osmode (getvar "osmode"))"#;

/// Error handler installed by the rewriter.
///
/// A user pressing Escape raises "Function cancelled", which is not worth reporting;
/// everything else is printed. Object snaps are restored either way.
pub const ERROR_HANDLER: &str = r#"(defun *error* (msg)
  (if (/= msg "Function cancelled")
    (princ (strcat "\nエラー: " msg))
  )
  (setvar "osmode" old_osmode)
  (princ)
)"#;

/// The one-line error handler used by the extractor.
const EXTRACT_ERROR_HANDLER: &str = r#"(defun *error* (msg) (setvar "osmode" old_osmode))"#;

/// The command every output defines.
pub const COMMAND_NAME: &str = "c:code";

/// Wrap an extracted slice: handler and command definition on a single line.
pub fn extract_wrapper(slice: &str) -> String {
    format!("{EXTRACT_ERROR_HANDLER}(defun {COMMAND_NAME} (){slice})")
}

/// Wrap a rewritten body in the full command definition.
pub fn rewrite_wrapper(body: &str) -> String {
    let mut out = format!("(defun {COMMAND_NAME} ()\n{CAPTURE_OSMODE}\n{ERROR_HANDLER}\n");
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(RESTORE_OSMODE);
    out.push_str("\n(princ)\n)\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    #[test]
    fn extract_wrapper_is_exact() {
        assert_eq!(
            extract_wrapper("(princ)"),
            r#"(defun *error* (msg) (setvar "osmode" old_osmode))(defun c:code ()(princ))"#
        );
    }

    #[test]
    fn rewrite_wrapper_reads_as_one_defun() {
        let out = rewrite_wrapper("(command \"line\" pt)");
        let forms = read(&out).unwrap();
        assert_eq!(forms.len(), 1);
        let args = forms[0].args_of("defun").unwrap();
        assert!(args[0].is_symbol(COMMAND_NAME));
        // capture, handler, body, restore, princ
        assert_eq!(args.len(), 2 + 5);
        assert!(args[2].is_call("setq"));
        assert!(args[3].is_call("defun"));
        assert!(args[4].is_call("command"));
        assert_eq!(args[5].to_string(), RESTORE_OSMODE);
        assert!(args[6].is_call("princ"));
    }

    #[test]
    fn rewrite_wrapper_with_empty_body() {
        let out = rewrite_wrapper("");
        assert!(!out.contains("\n\n"));
        assert_eq!(read(&out).unwrap().len(), 1);
    }
}
