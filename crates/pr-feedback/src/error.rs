use std::path::PathBuf;

use thiserror::Error;

pub type FeedbackResult<T> = Result<T, FeedbackError>;

#[derive(Debug, Error)]
/// Failure classes for one feedback invocation.
///
/// `ReadLog` is raised before any platform call. Every other variant comes
/// from the platform side and may follow a write the platform already
/// committed.
pub enum FeedbackError {
    #[error("failed to read validation log {}: {source}", path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("github api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("github api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FeedbackError {
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::ReadLog { .. })
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}
