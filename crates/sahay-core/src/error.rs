//! Error types shared by the dispatcher, configuration, and knowledge-base client.
//!
//! None of these cross an agent boundary: agents route `DispatchError` and `ParseError` to the
//! fallback responder. `ConfigError` is the one fatal class and is raised only at startup.

use thiserror::Error;

/// Startup configuration failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing credential: set {0} (or add it to .env)")]
    MissingCredential(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Structured model output that could not be decoded after fence normalization.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model returned no structured content")]
    Empty,
    #[error("malformed structured output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remote completion failure.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion response carried no text")]
    EmptyResponse,
    #[error("completion backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        DispatchError::Transport(e.to_string())
    }
}

/// Knowledge-base (vector database sidecar) failure.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("knowledge base not configured")]
    NotConfigured,
    #[error("knowledge base connection failed: {0}")]
    ConnectionFailed(String),
    #[error("knowledge base query failed: {0}")]
    QueryFailed(String),
}

pub type VectorResult<T> = Result<T, VectorError>;
