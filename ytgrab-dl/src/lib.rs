//! Type-safe Rust bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) for simple video downloads.
//!
//! ## Modules
//!
//! - [`dl`] - `YoutubeDL` option types and the [`Downloader`](dl::Downloader) wrapper
//! - [`format`] - Quality presets mapped to yt-dlp format selectors
//! - [`progress`] - Console progress reporting for yt-dlp progress hooks
//! - [`error`] - Error taxonomy (missing dependency, download failure, unexpected)
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytgrab_dl::dl::Downloader;
//! use ytgrab_dl::format::QualityIntent;
//! use ytgrab_dl::progress::ConsoleReporter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Downloader::new(QualityIntent::HeightCapped(720).into())
//!     .progress_hook(ConsoleReporter::stdout())
//!     .extract_info("https://youtu.be/jNQXAC9IVRw", true)?;
//!
//! println!("Downloaded: {}", info.title.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod dl;
pub mod error;
pub mod format;
pub mod progress;

pub use error::Error;
