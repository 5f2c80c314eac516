//! Error taxonomy for fetching and synchronization.
//!
//! Every fallible operation on the sync path returns `SyncError` so callers can
//! tell a dead transport from a bad status, a full disk or a broken manifest.

use std::path::PathBuf;

/// Error returned by the fetcher, the manifest source and the sync orchestration.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The transport subsystem could not be brought up for this process.
    #[error("transport initialization failed: {0}")]
    Initialization(String),

    /// Opening the request context or beginning the request failed.
    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// The terminal (non-redirect) response status was not 200.
    #[error("{url} returned HTTP {status}")]
    Protocol { url: String, status: u32 },

    /// A redirect response carried no usable `Location` value.
    #[error("redirect from {url} is unusable: {reason}")]
    InvalidRedirect { url: String, reason: String },

    /// The redirect chain exceeded the configured hop limit.
    #[error("gave up on {url} after {hops} redirects")]
    TooManyRedirects { url: String, hops: u32 },

    /// The transport failed while the response body was streaming.
    #[error("transfer from {url} failed: {message}")]
    Transfer { url: String, message: String },

    /// The transfer buffer could not grow or shrink.
    #[error("transfer buffer could not be resized to {requested} bytes")]
    Allocation { requested: usize },

    /// Local file open/write failure.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line could not be accepted as a relative path entry.
    #[error("manifest line {line}: {reason}")]
    ManifestParse { line: usize, reason: String },

    /// A base or manifest URL could not be parsed or joined.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status for `Protocol` errors, `None` for everything else.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            SyncError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}
