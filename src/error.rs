use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of an analysis run. Lenient conditions (partial records,
/// missing attributes, heuristic misses) never become errors.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// EPG document is not well-formed schedule markup
    #[error("Malformed EPG document: {0}")]
    MalformedEpg(String),

    /// Playlist could not be read or decoded
    #[error("Playlist unreadable ({path}): {reason}")]
    PlaylistUnreadable { path: PathBuf, reason: String },

    /// EPG file could not be read
    #[error("EPG unreadable ({path}): {reason}")]
    EpgUnreadable { path: PathBuf, reason: String },

    /// A report document could not be written
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
