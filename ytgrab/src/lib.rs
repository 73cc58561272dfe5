//! ytgrab - simple video downloader on top of yt-dlp.

pub mod cli;
pub mod fetch;
