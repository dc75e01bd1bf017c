//! Error types for the speech bridge

use crate::bridge::BridgeState;
use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("Query processing failed: {0}")]
    Query(String),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend for this capability was not configured at startup.
    #[error("{0} backend is not available")]
    CapabilityUnavailable(&'static str),

    #[error("Bridge cannot advance from {from:?}")]
    InvalidTransition { from: BridgeState },
}
