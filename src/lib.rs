//! Wrap generated AutoLISP in a `c:code` command that restores object snaps on exit or error.

pub mod reader;

pub mod data;

pub mod format;
pub use format::{format_file, FormatError, FormatOptions, FormatReport, Mode, Unwrap};
