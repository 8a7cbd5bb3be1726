//! Reading an AutoLISP file, transforming it, and writing the result.
//!
//! There are two transformations, selected by [`Mode`]:
//!
//! -   [`Mode::Extract`] keeps everything from the first `(` to the last `)` and wraps it
//!     with a one-line error handler. This is for raw model output, where the code is
//!     surrounded by prose.
//! -   [`Mode::Rewrite`] removes any previous command wrapper, inserts object snap
//!     restores and clears line by line (see [`rewrite`]), and wraps the result
//!     with the full error handler.
//!
//! Either way the result is the `c:code` command, written next to the input as `direction.lsp`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub mod extract;
pub mod rewrite;
pub mod template;
pub mod unwrap;

pub use unwrap::Unwrap;

/// Where the rewriter reads from when no input is given.
pub const DEFAULT_INPUT: &str = "../lisp_files/direction2.lsp";

/// Name of the output file, placed in the input's directory.
pub const OUTPUT_FILE_NAME: &str = "direction.lsp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Extract,
    Rewrite,
}

/// Everything needed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub mode: Mode,
    pub input: PathBuf,
    /// Overrides the default of `direction.lsp` next to the input.
    pub output: Option<PathBuf>,
    pub unwrap: Unwrap,
    /// Produce the text, but don't write it.
    pub dry_run: bool,
}

impl FormatOptions {
    pub fn extract(input: impl Into<PathBuf>) -> Self {
        FormatOptions {
            mode: Mode::Extract,
            input: input.into(),
            output: None,
            unwrap: Unwrap::default(),
            dry_run: false,
        }
    }

    pub fn rewrite() -> Self {
        FormatOptions {
            mode: Mode::Rewrite,
            input: PathBuf::from(DEFAULT_INPUT),
            output: None,
            unwrap: Unwrap::default(),
            dry_run: false,
        }
    }

    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_unwrap(mut self, unwrap: Unwrap) -> Self {
        self.unwrap = unwrap;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self
                .input
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(OUTPUT_FILE_NAME),
        }
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub text: String,
    /// False for a dry run.
    pub written: bool,
}

#[derive(Debug)]
pub enum FormatError {
    /// The extractor found no `(`...`)` pair.
    MalformedInput { path: PathBuf },
    MissingFile { path: PathBuf },
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::MalformedInput { path } => {
                write!(f, "括弧が見つかりませんでした: {}", path.display())
            }
            FormatError::MissingFile { path } => {
                write!(f, "入力ファイルが見つかりません: {}", path.display())
            }
            FormatError::Read { path, source } => {
                write!(f, "{} を読み込めませんでした: {source}", path.display())
            }
            FormatError::Write { path, source } => {
                write!(f, "{} に書き込めませんでした: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Read { source, .. } | FormatError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Read, transform, and (unless this is a dry run) write.
///
/// Nothing is written unless reading and transforming both succeed.
pub fn format_file(options: &FormatOptions) -> Result<FormatReport, FormatError> {
    let input = options.input.clone();
    let output = options.output_path();
    tracing::info!(input = %input.display(), mode = ?options.mode, "formatting");

    let content = read_source(&input)?;
    let text = match options.mode {
        Mode::Extract => {
            extract::extract(&content).ok_or_else(|| FormatError::MalformedInput {
                path: input.clone(),
            })?
        }
        Mode::Rewrite => rewrite::rewrite(&content, options.unwrap),
    };

    if !options.dry_run {
        std::fs::write(&output, &text).map_err(|source| FormatError::Write {
            path: output.clone(),
            source,
        })?;
        tracing::info!(output = %output.display(), bytes = text.len(), "wrote output");
    }

    Ok(FormatReport {
        input,
        output,
        text,
        written: !options.dry_run,
    })
}

fn read_source(path: &Path) -> Result<String, FormatError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => FormatError::MissingFile {
            path: path.to_owned(),
        },
        _ => FormatError::Read {
            path: path.to_owned(),
            source,
        },
    })
}
