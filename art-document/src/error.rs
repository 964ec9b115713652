//! Background fetch errors.

use thiserror::Error;

/// Errors that can occur while acquiring a background image.
///
/// These never escape the intent API. The loader logs them and reports
/// [`art_core::FetchStatus::Failed`] instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP layer failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Reading a local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The URL scheme is neither http(s) nor file.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The fetched bytes are not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The fetch was stopped before it produced a result.
    #[error("Fetch cancelled")]
    Cancelled,
}
