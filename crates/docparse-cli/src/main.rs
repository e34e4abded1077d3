use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docparse_core::{DocumentError, ParsedDocument, Settings};

mod logging;
mod output;

const USAGE: &str = "Usage: docparse <file_path> <file_type>";

/// Extract plain text and basic metadata from a PDF or DOCX file as JSON
#[derive(Parser, Debug)]
#[command(
    name = "docparse",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Path to the document
    #[arg(value_name = "file_path", allow_hyphen_values = true)]
    file_path: PathBuf,

    /// Document type: pdf or docx (case-insensitive)
    #[arg(value_name = "file_type", allow_hyphen_values = true)]
    file_type: OsString,
}

impl Cli {
    /// Parse exactly two positional arguments. Every argument is taken
    /// literally, so `--` and `-x` are ordinary values.
    fn from_args(args: Vec<OsString>) -> Result<Self, DocumentError> {
        let usage = || DocumentError::Usage(USAGE.to_string());
        if args.len() != 2 {
            return Err(usage());
        }
        let argv = [OsString::from("docparse"), OsString::from("--")]
            .into_iter()
            .chain(args);
        Self::try_parse_from(argv).map_err(|_| usage())
    }
}

fn main() -> ExitCode {
    // Backend panics are caught and reported as JSON; nothing goes to stderr.
    std::panic::set_hook(Box::new(|_| {}));

    let args = std::env::args_os().skip(1).collect();
    let result = Cli::from_args(args).and_then(|cli| run(&cli));

    let mut stdout = std::io::stdout().lock();
    let written = match &result {
        Ok(doc) => output::write_success(&mut stdout, doc),
        Err(err) => output::write_error(&mut stdout, err),
    };

    match (result, written) {
        (Ok(_), Ok(())) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn run(cli: &Cli) -> Result<ParsedDocument, DocumentError> {
    dotenvy::dotenv().ok();
    let (settings, skipped) = Settings::load();

    // The guard flushes the log file when this function returns.
    // A log directory that cannot be set up leaves logging off.
    let _guard = logging::init(&settings).ok().flatten();

    for err in &skipped {
        tracing::warn!(error = %err, "ignoring malformed config file");
    }
    tracing::debug!(?settings, "resolved settings");
    let parser = docparse_ingest::build_parser(&settings);
    let result = parser.parse(&cli.file_path, &cli.file_type.to_string_lossy());
    if let Err(ref err) = result {
        tracing::warn!(path = %cli.file_path.display(), error = %err, "extraction failed");
    }
    result
}
