use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StartError>;

/// Every way `start` can fail. None of them are retried.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("{tool} is not installed or not on PATH")]
    MissingPrerequisite { tool: String },

    #[error("failed to create {path:?}: {source}")]
    StateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to write {path:?}: {source}")]
    WriteDefinition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image pull failed ({status})")]
    ImagePull { status: String },

    #[error("error starting meshery: {status}")]
    ComposeUp { status: String },

    #[error("container runtime query failed: {reason}")]
    RuntimeQuery { reason: String },

    #[error("failed to open {url} in a browser: {reason}")]
    BrowserLaunch { url: String, reason: String },

    #[error("log follow failed: {reason}")]
    LogFollow { reason: String },
}
