//! Bounded chunk dispatcher.
//!
//! Chunks run in strict sequential batches of at most `max_concurrency`.
//! A batch must settle completely, successes and failures alike, before the
//! next batch starts. A failed chunk never cancels its batch-mates and never
//! aborts the job here; every chunk produces exactly one outcome and the
//! assembler decides what the collection means.

use crate::audio::AudioBuffer;
use crate::pipeline::planner::ChunkDescriptor;
use crate::progress::emitter::ProgressEmitter;
use crate::remote::SegmentTranscriber;
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::time::Instant;

/// Terminal state of one dispatched chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Success { index: usize, text: String },
    Failure { index: usize, error: String },
}

impl ChunkOutcome {
    pub fn index(&self) -> usize {
        match self {
            ChunkOutcome::Success { index, .. } | ChunkOutcome::Failure { index, .. } => *index,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ChunkOutcome::Success { text, .. } => Some(text),
            ChunkOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ChunkOutcome::Success { .. } => None,
            ChunkOutcome::Failure { error, .. } => Some(error),
        }
    }
}

/// Runs chunk transcription with a fixed concurrency ceiling.
#[derive(Debug, Clone, Copy)]
pub struct BoundedDispatcher {
    max_concurrency: usize,
}

impl BoundedDispatcher {
    /// `max_concurrency` below 1 is clamped to 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Transcribes every chunk and returns one outcome per chunk.
    ///
    /// Emits a progress frame each time a chunk settles, with cumulative
    /// word count over successes and a remaining-time estimate derived from
    /// the average settle rate so far.
    pub async fn dispatch(
        &self,
        audio: &AudioBuffer,
        chunks: &[ChunkDescriptor],
        transcriber: &dyn SegmentTranscriber,
        emitter: &ProgressEmitter,
    ) -> Vec<ChunkOutcome> {
        let total = chunks.len();
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(total);
        let mut settled = 0usize;
        let mut words_processed = 0usize;

        for batch in chunks.chunks(self.max_concurrency) {
            let mut in_flight = FuturesUnordered::new();
            for descriptor in batch {
                let samples = audio.chunk(descriptor);
                let index = descriptor.index;
                in_flight.push(async move {
                    match transcriber.transcribe(index, &samples).await {
                        Ok(text) => ChunkOutcome::Success { index, text },
                        Err(e) => ChunkOutcome::Failure {
                            index,
                            error: e.to_string(),
                        },
                    }
                });
            }

            // Await the whole batch before admitting the next one
            while let Some(outcome) = in_flight.next().await {
                settled += 1;
                match &outcome {
                    ChunkOutcome::Success { text, .. } => {
                        words_processed += text.split_whitespace().count();
                    }
                    ChunkOutcome::Failure { index, error } => {
                        log::warn!("Chunk {} failed: {}", index, error);
                    }
                }

                let progress = (settled as f64 / total as f64) * 100.0;
                let processing_time = started.elapsed().as_secs_f64();
                let remaining = (total - settled) as f64;
                let estimated_time_remaining = (processing_time / settled as f64) * remaining;

                emitter
                    .chunk_settled(
                        settled,
                        total,
                        words_processed,
                        progress,
                        processing_time,
                        estimated_time_remaining,
                    )
                    .await;
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}
