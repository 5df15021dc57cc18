//! Default configuration constants for whispr.
//!
//! Shared constants used across configuration types to keep the pipeline,
//! the progress protocol, and the client in agreement.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and is what the remote
/// recognition model expects.
pub const SAMPLE_RATE: u32 = 16000;

/// Nominal chunk duration in seconds.
///
/// Each chunk becomes one remote recognition call, so this is bounded by the
/// model's per-call input limit.
pub const CHUNK_SECS: u64 = 30;

/// Overlap between consecutive chunks in seconds.
///
/// Shared audio at chunk boundaries reduces word cutoff errors where a chunk
/// split lands mid-word.
pub const OVERLAP_SECS: u64 = 1;

/// Minimum chunk duration floor in seconds.
///
/// Short recordings are not split into chunks below this duration; the
/// planner recomputes the per-chunk size instead of producing degenerate
/// near-empty chunks.
pub const MIN_CHUNK_SECS: u64 = 5;

/// Maximum number of in-flight recognition calls.
pub const MAX_CONCURRENCY: usize = 3;

/// Assumed wall-clock seconds to process one batch of chunks.
///
/// Used only for the up-front time estimate reported to the client before
/// any chunk has settled.
pub const SECONDS_PER_BATCH: u64 = 20;

/// Flat buffer added to the time estimate for setup and summarization.
pub const ESTIMATE_BUFFER_SECS: u64 = 10;

/// Maximum tokens requested from the summarization model.
pub const SUMMARY_MAX_TOKENS: u32 = 500;

/// Sampling temperature for summarization.
pub const SUMMARY_TEMPERATURE: f32 = 0.7;

/// Nucleus sampling parameter for summarization.
pub const SUMMARY_TOP_P: f32 = 0.95;

/// Default summarization model name.
pub const SUMMARY_MODEL: &str = "mistral-large-latest";

/// Default summarization endpoint (OpenAI-compatible chat completions).
pub const SUMMARIZE_URL: &str = "https://api.mistral.ai/v1/chat/completions";

/// Default transcription endpoint.
///
/// Points at a locally hosted Whisper-compatible recognition service; a
/// hosted endpoint is configured via `[transcription].endpoint` or
/// `WHISPR_TRANSCRIBE_URL`.
pub const TRANSCRIBE_URL: &str = "http://localhost:8000/transcribe";

/// Overall client-side timeout for one upload request.
///
/// Timing out aborts the client's view of the request; remote model calls
/// already issued by the server are not cancelled.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Minimum interval between accepted authoritative progress updates.
pub const PROGRESS_ACCEPT_INTERVAL: Duration = Duration::from_secs(1);

/// Progress delta (percentage points) that bypasses the accept interval.
pub const PROGRESS_ACCEPT_DELTA: f64 = 2.0;

/// Credential header carrying the summarization API key.
pub const API_KEY_HEADER: &str = "X-Mistral-Api-Key";

/// File extensions accepted by upload validation.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "m4a"];
