use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between handing a query to the backend and
/// getting an answer string back.
///
/// The transcript collapses all of these into one sentinel string; the
/// variants only exist so the log says what actually happened.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to chat backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("chat backend returned status {0}")]
    Status(StatusCode),

    #[error("could not decode chat backend reply: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("backend task did not complete: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
