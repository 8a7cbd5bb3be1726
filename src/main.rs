//! Format an AutoLISP file as the `c:code` command.
//!
//! ```ignore
//! format_lisp answer.txt        # extract: keep the bracketed code, write direction.lsp beside it
//! format_lisp                   # rewrite ../lisp_files/direction2.lsp into ../lisp_files/direction.lsp
//! format_lisp --dry-run in.lsp  # print instead of writing
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use format_lisp::{format_file, FormatError, FormatOptions, Mode, Unwrap};

#[derive(Parser, Debug)]
#[command(
    name = "format_lisp",
    version,
    about = "Wrap AutoLISP code as the c:code command"
)]
struct Cli {
    /// File to format. Without it, the rewriter reads ../lisp_files/direction2.lsp
    input: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        help = "Transformation to apply [default: extract with INPUT, rewrite without]"
    )]
    mode: Option<ModeArg>,
    #[arg(short, long, help = "Write here instead of direction.lsp next to the input")]
    output: Option<PathBuf>,
    #[arg(long, help = "Strip a previous wrapper by structure instead of by pattern")]
    structural_unwrap: bool,
    #[arg(long, help = "Print the result instead of writing it")]
    dry_run: bool,
    #[arg(short, long, action = ArgAction::Count, help = "More log output on stderr (repeatable)")]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Keep everything from the first ( to the last )
    Extract,
    /// Apply the object snap line rules
    Rewrite,
}

impl Cli {
    fn options(&self) -> Result<FormatOptions, clap::Error> {
        let mode = match (self.mode, &self.input) {
            (Some(mode), _) => mode,
            (None, Some(_)) => ModeArg::Extract,
            (None, None) => ModeArg::Rewrite,
        };
        let mut options = match (mode, &self.input) {
            (ModeArg::Extract, Some(input)) => FormatOptions::extract(input),
            (ModeArg::Extract, None) => {
                return Err(Cli::command().error(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    "--mode extract needs an INPUT file",
                ))
            }
            (ModeArg::Rewrite, input) => {
                let options = FormatOptions::rewrite();
                match input {
                    Some(input) => options.with_input(input),
                    None => options,
                }
            }
        };
        if let Some(output) = &self.output {
            options = options.with_output(output);
        }
        if self.structural_unwrap {
            options = options.with_unwrap(Unwrap::Structural);
        }
        Ok(options.with_dry_run(self.dry_run))
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let options = match cli.options() {
        Ok(options) => options,
        Err(err) => err.exit(),
    };

    if !options.dry_run {
        match std::env::current_dir() {
            Ok(dir) => println!("Current working directory: {}", dir.display()),
            Err(err) => tracing::warn!(%err, "could not read working directory"),
        }
        println!("Processing file: {}", options.input.display());
    }

    match format_file(&options) {
        Ok(report) => {
            if report.written {
                println!("Formatted file saved to: {}", report.output.display());
                println!("整形が完了しました");
            } else {
                println!("{}", report.text);
            }
            ExitCode::SUCCESS
        }
        Err(err @ FormatError::MissingFile { .. }) if options.mode == Mode::Rewrite => {
            println!("{err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::debug!(?err, "formatting failed");
            println!("エラーが発生しました: {err}");
            ExitCode::FAILURE
        }
    }
}
