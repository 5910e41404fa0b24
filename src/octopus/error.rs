use thiserror::Error;

/// Errors surfaced by the client factory and the CLI around it.
///
/// Payloads are plain strings so a single failed construction can be handed,
/// cloned, to every caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OctoError {
    #[error("{0}")]
    Connectivity(String),

    #[error("invalid server URL '{0}'")]
    InvalidServerUrl(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("partition must be specified when not running interactively; please set it via the environment variable or the command line.")]
    SpaceUnspecified,

    #[error("cannot find partition '{0}'")]
    SpaceNotFound(String),

    #[error("partition selection was cancelled")]
    PromptCancelled,

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for OctoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for OctoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

impl From<reqwest::Error> for OctoError {
    fn from(value: reqwest::Error) -> Self {
        Self::Connectivity(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OctoError>;
