//! Fetch command - resolve quality, run yt-dlp, print a summary.

use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser};
use eyre::{Result, ensure};
use std::path::PathBuf;
use ytgrab_dl::dl::{DownloadInfo, DownloadOptions, Downloader, OutputPaths, OutputTemplates};
use ytgrab_dl::format::QualityIntent;
use ytgrab_dl::progress::ConsoleReporter;

pub const DEFAULT_OUTPUT_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// `-f` choices, parsed through [`QualityIntent`]'s `FromStr`.
fn quality_parser() -> impl TypedValueParser<Value = QualityIntent> {
    PossibleValuesParser::new([
        PossibleValue::new("best").help("Best video + best audio combined"),
        PossibleValue::new("bestvideo").help("Best quality video only (no audio)"),
        PossibleValue::new("bestaudio").help("Best quality audio only"),
        PossibleValue::new("720").help("~720p video+audio"),
        PossibleValue::new("1080").help("~1080p video+audio (if available)"),
        PossibleValue::new("audio").help("Audio only, converted to m4a"),
    ])
    .try_map(|name| name.parse::<QualityIntent>())
}

/// CLI arguments for a download.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// YouTube video or playlist URL
    pub url: String,

    /// Quality/format to download
    #[arg(short, long, default_value = "best", value_parser = quality_parser())]
    pub format: QualityIntent,

    /// Output filename template
    #[arg(short, long, default_value = DEFAULT_OUTPUT_TEMPLATE)]
    pub output: String,

    /// Download directory (default: current directory)
    #[arg(short = 'P', long)]
    pub paths: Option<PathBuf>,

    /// List all available formats and exit
    #[arg(long)]
    pub list_formats: bool,

    /// Download only the video, even if URL is a playlist
    #[arg(long)]
    pub no_playlist: bool,
}

/// Resolved configuration for a download.
#[derive(Debug)]
pub struct Config {
    pub url: String,
    pub intent: QualityIntent,
    pub output_template: String,
    pub output_dir: Option<PathBuf>,
    pub list_formats: bool,
    pub no_playlist: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        ensure!(!args.url.trim().is_empty(), "URL must not be empty");
        ensure!(
            !args.output.is_empty(),
            "output template must not be empty"
        );

        Ok(Self {
            url: args.url,
            intent: args.format,
            output_template: args.output,
            output_dir: args.paths,
            list_formats: args.list_formats,
            no_playlist: args.no_playlist,
        })
    }
}

impl Config {
    /// yt-dlp params for this run.
    pub fn download_options(&self) -> DownloadOptions {
        let mut opts: DownloadOptions = self.intent.into();

        opts.outtmpl = Some(OutputTemplates::simple(self.output_template.clone()));
        opts.paths = self.output_dir.as_deref().map(OutputPaths::home);
        opts.noplaylist = Some(self.no_playlist);

        if self.list_formats {
            opts.listformats = Some(true);
            opts.quiet = Some(true);
            opts.simulate = Some(true);
        }

        opts
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(url = config.url, intent = ?config.intent, "fetching");

    let downloader =
        Downloader::new(config.download_options()).progress_hook(ConsoleReporter::stdout());

    println!("\nFetching info... {}", config.url);

    let info = downloader.extract_info(&config.url, !config.list_formats)?;

    if config.list_formats {
        return Ok(());
    }

    print!("{}", summary(&info));

    Ok(())
}

/// Final report: playlist size, or title and duration for a single video.
pub fn summary(info: &DownloadInfo) -> String {
    if let Some(entries) = &info.entries {
        let title = info.title.as_deref().unwrap_or("Unknown");
        return format!("\nPlaylist: {title}\nFound {} videos\n\n", entries.len());
    }

    let title = info.title.as_deref().unwrap_or("Unknown title");
    let mut text = format!("\nTitle: {title}\n");

    if let Some(secs) = info.duration.map(|d| d as u64).filter(|&s| s > 0) {
        text.push_str(&format!("Duration: {}\n", format_duration(secs)));
    }

    text
}

/// `MM:SS`, or `HH:MM:SS` when at least an hour long.
pub fn format_duration(secs: u64) -> String {
    let (mins, secs) = (secs / 60, secs % 60);
    let (hrs, mins) = (mins / 60, mins % 60);

    if hrs > 0 {
        format!("{hrs:02}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}
