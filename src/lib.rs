//! whispr - chunked audio transcription and summarization
//!
//! Splits a recording into overlapping chunks, transcribes them against a
//! remote speech model with bounded concurrency, assembles the transcript,
//! and optionally summarizes it. Progress is reported over a sparse
//! line-delimited frame protocol that a client can follow and reconcile
//! into a smooth display.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod remote;
pub mod upload;

// Core pipeline
pub use audio::AudioBuffer;
pub use pipeline::{assemble, plan, BoundedDispatcher, ChunkDescriptor, ChunkOutcome};
pub use pipeline::{JobResult, JobStats, TranscriptionJob};

// Remote adapter traits
pub use remote::{SegmentTranscriber, Summarizer};

// Progress protocol
pub use progress::{FrameDecoder, ProgressEmitter, ProgressFrame, ReconcilerState};

// Error handling
pub use error::{Result, WhisprError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
