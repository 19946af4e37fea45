//! Backend error taxonomy.

use thiserror::Error;

/// Failures raised while fetching or storing a whitelist.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or subprocess failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// Credentials were rejected by the backend.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The backing document container does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend returned something that is not a whitelist document.
    #[error("malformed whitelist document: {0}")]
    Decode(String),

    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    /// The backend cannot address the requested target.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Auth(_) | Self::MissingCredential(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
            Self::InvalidTarget(_) => "invalid_target",
            Self::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}
