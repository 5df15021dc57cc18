//! Job orchestrator: plan, dispatch, assemble, summarize.
//!
//! A job runs one decoded recording through the whole pipeline and reports
//! every milestone through a `ProgressEmitter`. Transcription failures follow
//! the assembler's rules; a summarization failure never fails the job, it
//! degrades the result to transcript-only with the error noted.

use crate::audio::AudioBuffer;
use crate::config::Config;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::assembler::assemble;
use crate::pipeline::dispatcher::BoundedDispatcher;
use crate::pipeline::planner::{plan, PlannerConfig};
use crate::progress::emitter::ProgressEmitter;
use crate::remote::{SegmentTranscriber, Summarizer};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Timing facts about a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStats {
    /// Wall-clock seconds from job start to result.
    pub processing_time: f64,
    /// Duration of the input audio in seconds.
    pub audio_duration: f64,
}

/// Final payload of a successful job.
///
/// `summary` is absent and `error` present when summarization failed after a
/// successful transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub transcription: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub stats: JobStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One transcription-and-summary run over a decoded recording.
pub struct TranscriptionJob<T, S> {
    transcriber: T,
    summarizer: Option<S>,
    planner: PlannerConfig,
    dispatcher: BoundedDispatcher,
    chunk_secs: u64,
}

impl<T: SegmentTranscriber, S: Summarizer> TranscriptionJob<T, S> {
    /// Builds a job from the config. Pass `summarizer: None` to skip the
    /// summary phase entirely.
    pub fn new(transcriber: T, summarizer: Option<S>, config: &Config) -> Self {
        Self {
            transcriber,
            summarizer,
            planner: PlannerConfig::from_config(&config.chunking, config.audio.sample_rate),
            dispatcher: BoundedDispatcher::new(config.dispatch.max_concurrency),
            chunk_secs: config.chunking.chunk_secs,
        }
    }

    /// Runs the pipeline to completion, emitting a terminal `result` or
    /// `error` frame before returning.
    pub async fn run(&self, audio: &AudioBuffer, emitter: &ProgressEmitter) -> Result<JobResult> {
        match self.run_inner(audio, emitter).await {
            Ok(result) => {
                emitter.result(result.clone()).await;
                Ok(result)
            }
            Err(e) => {
                emitter.error(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        audio: &AudioBuffer,
        emitter: &ProgressEmitter,
    ) -> Result<JobResult> {
        let started = Instant::now();
        let audio_duration = audio.duration_secs();

        emitter.init().await;
        emitter.loading_model().await;
        emitter.loading_audio(audio_duration).await;

        let chunks = plan(audio.len(), &self.planner)?;
        let batches = chunks.len().div_ceil(self.dispatcher.max_concurrency());
        let estimated_seconds =
            (batches as u64 * defaults::SECONDS_PER_BATCH + defaults::ESTIMATE_BUFFER_SECS) as f64;
        log::info!(
            "Planned {} chunks in {} batches, estimated {}s",
            chunks.len(),
            batches,
            estimated_seconds
        );
        emitter
            .loading_config(chunks.len(), self.chunk_secs as f64, estimated_seconds)
            .await;
        emitter.loading_complete().await;

        let outcomes = self
            .dispatcher
            .dispatch(audio, &chunks, &self.transcriber, emitter)
            .await;
        let transcription = assemble(outcomes)?;

        let (summary, error) = match &self.summarizer {
            Some(summarizer) => {
                emitter.summarizing().await;
                match summarizer.summarize(&transcription).await {
                    Ok(summary) => (Some(summary), None),
                    Err(e) => {
                        log::warn!("Summarization failed, returning transcript only: {}", e);
                        (None, Some(format!("Summarization failed: {}", e)))
                    }
                }
            }
            None => (None, None),
        };

        Ok(JobResult {
            transcription,
            summary,
            stats: JobStats {
                processing_time: started.elapsed().as_secs_f64(),
                audio_duration,
            },
            error,
        })
    }
}
