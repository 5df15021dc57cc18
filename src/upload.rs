//! Upload handling: validation, decode, and the streaming job surface.
//!
//! This is the producer-side entry point an HTTP layer (or the CLI) calls
//! with a received file. Validation failures are rejected up front;
//! everything after validation reports through the progress stream.

use crate::audio::AudioBuffer;
use crate::config::Config;
use crate::defaults;
use crate::error::{Result, WhisprError};
use crate::pipeline::job::{JobResult, TranscriptionJob};
use crate::progress::emitter::ProgressEmitter;
use crate::progress::frame::ProgressFrame;
use crate::remote::{RemoteSummarizer, RemoteWhisperTranscriber, SegmentTranscriber, Summarizer};
use tokio::sync::mpsc;

/// One received upload, before validation.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Summarization credential supplied by the caller.
    pub api_key: Option<String>,
}

impl UploadRequest {
    /// Rejects structurally invalid uploads before any audio work starts.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(WhisprError::Validation {
                message: "No file selected".to_string(),
            });
        }
        if self.bytes.is_empty() {
            return Err(WhisprError::Validation {
                message: "Uploaded file is empty".to_string(),
            });
        }
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension {
            Some(ext) if defaults::ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(WhisprError::Validation {
                    message: format!(
                        "Unsupported file type; allowed: {}",
                        defaults::ALLOWED_EXTENSIONS.join(", ")
                    ),
                });
            }
        }
        if self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(WhisprError::Validation {
                message: "API key is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Runs a job while forwarding every frame as an encoded `data:` line.
///
/// The forwarding task ends when the job's terminal frame has been encoded
/// or the line receiver goes away; a departed consumer does not abort the
/// job.
pub async fn run_streaming<T: SegmentTranscriber, S: Summarizer>(
    job: &TranscriptionJob<T, S>,
    audio: &AudioBuffer,
    lines: mpsc::Sender<String>,
) -> Result<JobResult> {
    let (frame_tx, mut frame_rx) = mpsc::channel::<ProgressFrame>(32);
    let emitter = ProgressEmitter::new(frame_tx);

    let forwarder = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            match frame.encode_line() {
                Ok(line) => {
                    if lines.send(line).await.is_err() {
                        break;
                    }
                }
                Err(e) => log::error!("Dropping unencodable progress frame: {}", e),
            }
        }
    });

    let result = job.run(audio, &emitter).await;
    // Dropping the emitter closes the frame channel and lets the forwarder
    // drain to completion
    drop(emitter);
    if forwarder.await.is_err() {
        log::warn!("Frame forwarder task panicked");
    }
    result
}

/// Full upload path: validate, decode, transcribe, summarize, stream.
pub async fn handle_upload(
    request: UploadRequest,
    config: &Config,
    lines: mpsc::Sender<String>,
) -> Result<JobResult> {
    request.validate()?;
    log::info!(
        "Processing upload {:?} ({} bytes)",
        request.file_name,
        request.bytes.len()
    );

    let audio = AudioBuffer::from_wav_bytes(&request.bytes)?;
    let transcriber = RemoteWhisperTranscriber::new(
        &config.transcription.endpoint,
        config.transcription.api_key.clone(),
    );
    let summarizer = RemoteSummarizer::from_config(
        &config.summarization,
        request.api_key.clone().unwrap_or_default(),
    );
    let job = TranscriptionJob::new(transcriber, Some(summarizer), config);
    run_streaming(&job, &audio, lines).await
}
