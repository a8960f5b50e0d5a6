//! Error types for the image session and its collaborators.
//!
//! Every error here is recoverable: the session puts its previous state back
//! before returning one.

use std::path::PathBuf;
use std::time::Duration;

/// A driver's `next`/`preload` call failed.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("driver request failed: {0}")]
    Request(String),

    #[error("driver response malformed: {0}")]
    Response(String),
}

/// Fetching or decoding an image failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid image url {url:?}: {reason}")]
    Url { url: String, reason: String },

    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("image fetch returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image decode timed out after {0:?}")]
    Timeout(Duration),

    #[error("decode task failed: {0}")]
    Task(String),
}

/// The submission endpoint rejected or never received the payload.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("submit request failed: {0}")]
    Request(String),

    #[error("submit rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no driver registered as {0:?}")]
    UnknownDriver(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("submission encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("no image is ready")]
    NotReady,

    #[error("a source change is already in flight")]
    SourceLocked,
}
