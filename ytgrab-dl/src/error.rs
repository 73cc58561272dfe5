//! Error types for ytgrab-dl, split by how the caller should react.

use pyo3::PyErr;
use thiserror::Error;

/// Failures surfaced by the yt-dlp bindings and format parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The `yt_dlp` Python module could not be imported
    #[error("yt-dlp is not installed")]
    MissingDependency(#[source] PyErr),

    /// yt-dlp raised `DownloadError` (network, extraction, site-side error)
    #[error("{0}")]
    Download(String),

    /// Any other exception raised while talking to yt-dlp
    #[error("{kind}: {message}")]
    Unexpected { kind: String, message: String },

    /// Quality name that does not map to a format selector
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),
}
