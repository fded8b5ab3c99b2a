use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors that can occur while mirroring an organization
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inventory request failed with HTTP {status}: {message}")]
    Inventory { status: u16, message: String },

    #[error("HTTP error talking to the inventory service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to launch git: {source}")]
    GitLaunch { source: io::Error },

    #[error("Invalid remote URL for {repo}: {message}")]
    RemoteUrl { repo: String, message: String },

    #[error("Archive destination already exists: {destination}")]
    ArchiveCollision { destination: PathBuf },

    #[error("Failed to move {source_path} to {destination}: {source}")]
    ArchiveMove {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
