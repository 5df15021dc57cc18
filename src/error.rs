//! Error types for whispr.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhisprError {
    // Upload validation errors — rejected before any model call
    #[error("Invalid upload: {message}")]
    Validation { message: String },

    // Audio decoding errors
    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    #[error("Audio buffer contains no samples")]
    EmptyAudio,

    // Transcription errors
    #[error("Segment transcription failed: {message}")]
    SegmentTranscription { message: String },

    #[error("Transcription failed for all {} chunks: {}", errors.len(), errors.join("; "))]
    TotalTranscriptionFailure { errors: Vec<String> },

    // Summarization errors
    #[error("Summarization failed: {message}")]
    Summarization { message: String },

    // Progress stream errors
    #[error("Invalid event frame: {message}")]
    StreamParse { message: String },

    #[error("Processing timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // Remote call transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhisprError>;
