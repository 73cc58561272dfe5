//! CLI argument definitions using clap.

use clap::Parser;
use eyre::Result;
use ytgrab_dl::Error;

const EXAMPLES: &str = "\
  ytgrab https://youtu.be/dQw4w9WgXcQ
  ytgrab https://youtu.be/dQw4w9WgXcQ -f 1080
  ytgrab https://youtu.be/dQw4w9WgXcQ -f audio
  ytgrab https://youtube.com/playlist?list=PL... --no-playlist";

const MISSING_DEPENDENCY: &str = "\
Error: yt-dlp is not installed
Please run:   pip install --upgrade yt-dlp";

#[derive(Debug, Parser)]
#[command(name = "ytgrab")]
#[command(about = "Simple YouTube video downloader")]
#[command(version)]
#[command(after_help = format!("Examples:\n{EXAMPLES}"))]
pub struct Cli {
    #[command(flatten)]
    pub args: crate::fetch::Args,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    crate::fetch::execute(cli.args.try_into()?)
}

/// Text printed when the program is started without arguments.
pub fn usage() -> String {
    format!("Usage examples:\n{EXAMPLES}\n\nFirst time? Run:  pip install --upgrade yt-dlp\n\n")
}

/// User-facing message for a failed run.
pub fn failure_message(report: &eyre::Report) -> String {
    match report.downcast_ref::<Error>() {
        Some(Error::MissingDependency(_)) => MISSING_DEPENDENCY.to_string(),
        Some(Error::Download(message)) => format!("Download failed: {message}"),
        Some(Error::Unexpected { kind, message }) => {
            format!("Unexpected error: {kind}: {message}")
        }
        _ => format!("Unexpected error: {report:#}"),
    }
}
