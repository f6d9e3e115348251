//! Error types for the Parley gateway

use thiserror::Error;

/// Result type alias for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Parley gateway
///
/// The five pipeline variants (`DeviceUnavailable`, `Transcription`,
/// `ReplyGeneration`, `Synthesis`, `Playback`) are terminal for the current
/// voice turn; none are retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Persona not found
    #[error("persona not found: {0}")]
    PersonaNotFound(String),

    /// Microphone permission or hardware failure
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Speech-to-text failure (non-success status or empty transcript)
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Reply generation failure (includes malformed or empty API responses)
    #[error("reply generation failed: {0}")]
    ReplyGeneration(String),

    /// Text-to-speech failure
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Audio decode or playback failure
    #[error("playback failed: {0}")]
    Playback(String),

    /// A voice turn is already in flight for this session
    #[error("a voice turn is already in progress")]
    Busy,

    /// Authentication/authorization error
    #[error("auth error: {0}")]
    Auth(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
