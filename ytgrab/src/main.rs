//! ytgrab CLI - video downloader

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ytgrab::cli::{Cli, failure_message, run_cli, usage};
use ytgrab_dl::dl::ensure_installed;

fn main() -> ExitCode {
    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = ensure_installed() {
        tracing::debug!(?err, "dependency check failed");
        println!("{}", failure_message(&eyre::Report::new(err)));
        return ExitCode::FAILURE;
    }

    if std::env::args_os().len() <= 1 {
        print!("{}", usage());
        return ExitCode::SUCCESS;
    }

    match run_cli(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::debug!(?report, "run failed");
            println!("\n{}", failure_message(&report));
            ExitCode::FAILURE
        }
    }
}
