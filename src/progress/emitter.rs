//! Producer side of the progress protocol.
//!
//! `ProgressEmitter` wraps a channel of frames. Sends are best-effort: a
//! consumer that stopped listening never fails the pipeline, the frames are
//! simply dropped.

use crate::pipeline::job::JobResult;
use crate::progress::frame::{LoadingStep, Phase, ProgressFrame, ProgressUpdate};
use tokio::sync::mpsc;

/// Emits progress frames at pipeline milestones.
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    tx: mpsc::Sender<ProgressFrame>,
}

impl ProgressEmitter {
    pub fn new(tx: mpsc::Sender<ProgressFrame>) -> Self {
        Self { tx }
    }

    async fn send(&self, frame: ProgressFrame) {
        // Consumer may be gone; progress is advisory
        if self.tx.send(frame).await.is_err() {
            log::trace!("Progress receiver dropped, discarding frame");
        }
    }

    async fn send_update(&self, update: ProgressUpdate) {
        self.send(ProgressFrame::Progress(update)).await;
    }

    pub async fn init(&self) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Init),
            text: Some("Initializing transcription process...".to_string()),
            progress: Some(0.0),
            ..Default::default()
        })
        .await;
    }

    pub async fn loading_model(&self) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Loading),
            step: Some(LoadingStep::Model),
            text: Some("Connecting to transcription backend...".to_string()),
            ..Default::default()
        })
        .await;
    }

    pub async fn loading_audio(&self, audio_duration: f64) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Loading),
            step: Some(LoadingStep::Audio),
            text: Some(format!(
                "Preparing audio for processing (duration: {})...",
                format_seconds(audio_duration)
            )),
            audio_duration: Some(audio_duration),
            ..Default::default()
        })
        .await;
    }

    pub async fn loading_config(
        &self,
        total_chunks: usize,
        chunk_secs: f64,
        estimated_seconds: f64,
    ) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Loading),
            step: Some(LoadingStep::Config),
            text: Some(format!(
                "Audio will be processed in {} chunks of {} seconds. Estimated time: {}",
                total_chunks,
                chunk_secs,
                format_seconds(estimated_seconds)
            )),
            total_chunks: Some(total_chunks),
            estimated_seconds: Some(estimated_seconds),
            ..Default::default()
        })
        .await;
    }

    pub async fn loading_complete(&self) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Loading),
            step: Some(LoadingStep::Complete),
            text: Some("Starting transcription...".to_string()),
            ..Default::default()
        })
        .await;
    }

    /// Emitted once per settled chunk during transcription.
    #[allow(clippy::too_many_arguments)]
    pub async fn chunk_settled(
        &self,
        current_chunk: usize,
        total_chunks: usize,
        words_processed: usize,
        progress: f64,
        processing_time: f64,
        estimated_time_remaining: f64,
    ) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Transcribing),
            text: Some(format!(
                "Transcribing chunk {} of {} ({} words so far)...",
                current_chunk, total_chunks, words_processed
            )),
            progress: Some(progress),
            current_chunk: Some(current_chunk),
            total_chunks: Some(total_chunks),
            words_processed: Some(words_processed),
            processing_time: Some(processing_time),
            estimated_time_remaining: Some(estimated_time_remaining),
            ..Default::default()
        })
        .await;
    }

    pub async fn summarizing(&self) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Summarizing),
            text: Some("Analyzing transcription and generating summary...".to_string()),
            progress: Some(100.0),
            ..Default::default()
        })
        .await;
    }

    pub async fn result(&self, result: JobResult) {
        self.send_update(ProgressUpdate {
            phase: Some(Phase::Complete),
            text: Some("Transcription complete".to_string()),
            progress: Some(100.0),
            ..Default::default()
        })
        .await;
        self.send(ProgressFrame::Result(result)).await;
    }

    pub async fn error(&self, message: String) {
        self.send(ProgressFrame::Error { error: message }).await;
    }
}

/// Renders a seconds value for status text: `42.0 seconds` under a minute,
/// `2 min 5.0 sec` above.
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1} seconds", seconds)
    } else {
        let minutes = (seconds / 60.0).floor() as u64;
        let rest = seconds - (minutes as f64) * 60.0;
        format!("{} min {:.1} sec", minutes, rest)
    }
}
