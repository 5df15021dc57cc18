//! Consumer-side progress reconciler.
//!
//! The consumer sees two progress sources: authoritative percentages carried
//! by frames, and a local once-per-second prediction derived from the
//! producer's up-front estimate. The reconciler merges both into a single
//! displayed value.
//!
//! Authoritative values are throttled: one is accepted only when at least
//! the accept interval has passed since the last accepted value, or when it
//! differs from the displayed value by more than the accept delta. The
//! prediction is applied only when strictly greater than the displayed
//! value, so the bar never moves backwards on a timer tick.

use crate::defaults;
use crate::pipeline::job::JobResult;
use crate::progress::frame::{LoadingStep, Phase, ProgressFrame, ProgressUpdate};
use std::time::Instant;

/// Terminal state of a followed job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Box<JobResult>),
    Failed(String),
}

/// Accumulated view of a progress stream.
///
/// Frames are sparse patches; every field here holds the last value seen.
/// `apply_frame` and `apply_tick` take time explicitly so throttling is
/// deterministic under test.
#[derive(Debug, Default)]
pub struct ReconcilerState {
    pub phase: Option<Phase>,
    pub step: Option<LoadingStep>,
    pub status: Option<String>,
    pub displayed_progress: f64,
    pub current_chunk: Option<usize>,
    pub total_chunks: Option<usize>,
    pub words_processed: Option<usize>,
    pub audio_duration: Option<f64>,
    pub estimated_seconds: Option<f64>,
    pub processing_time: Option<f64>,
    pub estimated_time_remaining: Option<f64>,
    pub outcome: Option<JobOutcome>,
    elapsed_seconds: u64,
    last_accepted: Option<Instant>,
}

impl ReconcilerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one frame, last-value-wins per field.
    pub fn apply_frame(&mut self, frame: &ProgressFrame, now: Instant) {
        match frame {
            ProgressFrame::Progress(update) => self.merge_update(update, now),
            ProgressFrame::Result(result) => {
                self.phase = Some(Phase::Complete);
                self.displayed_progress = 100.0;
                self.outcome = Some(JobOutcome::Completed(Box::new(result.clone())));
            }
            ProgressFrame::Error { error } => {
                self.phase = Some(Phase::Error);
                self.outcome = Some(JobOutcome::Failed(error.clone()));
            }
        }
    }

    fn merge_update(&mut self, update: &ProgressUpdate, now: Instant) {
        if let Some(phase) = update.phase {
            self.phase = Some(phase);
        }
        if let Some(step) = update.step {
            self.step = Some(step);
        }
        if let Some(text) = &update.text {
            self.status = Some(text.clone());
        }
        if let Some(current_chunk) = update.current_chunk {
            self.current_chunk = Some(current_chunk);
        }
        if let Some(total_chunks) = update.total_chunks {
            self.total_chunks = Some(total_chunks);
        }
        if let Some(words_processed) = update.words_processed {
            self.words_processed = Some(words_processed);
        }
        if let Some(audio_duration) = update.audio_duration {
            self.audio_duration = Some(audio_duration);
        }
        if let Some(estimated_seconds) = update.estimated_seconds {
            self.estimated_seconds = Some(estimated_seconds);
        }
        if let Some(processing_time) = update.processing_time {
            self.processing_time = Some(processing_time);
        }
        if let Some(estimated_time_remaining) = update.estimated_time_remaining {
            self.estimated_time_remaining = Some(estimated_time_remaining);
        }
        if let Some(progress) = update.progress {
            if self.accepts_progress(progress, now) {
                self.displayed_progress = progress;
                self.last_accepted = Some(now);
            }
        }
    }

    fn accepts_progress(&self, progress: f64, now: Instant) -> bool {
        match self.last_accepted {
            None => true,
            Some(last) => {
                now.duration_since(last) >= defaults::PROGRESS_ACCEPT_INTERVAL
                    || (progress - self.displayed_progress).abs()
                        > defaults::PROGRESS_ACCEPT_DELTA
            }
        }
    }

    /// Advances the once-per-second local clock and applies the predicted
    /// percentage when it beats the displayed one.
    pub fn apply_tick(&mut self) {
        if self.is_done() {
            return;
        }
        self.elapsed_seconds += 1;
        if let Some(estimated) = self.estimated_seconds {
            if estimated > 0.0 {
                let predicted =
                    ((self.elapsed_seconds as f64 / estimated) * 100.0).min(100.0);
                if predicted > self.displayed_progress {
                    self.displayed_progress = predicted;
                }
            }
        }
    }

    /// Seconds of local clock elapsed since following began.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::job::JobStats;
    use std::time::Duration;

    fn progress_frame(progress: f64) -> ProgressFrame {
        ProgressFrame::Progress(ProgressUpdate {
            progress: Some(progress),
            ..Default::default()
        })
    }

    #[test]
    fn first_authoritative_value_is_always_accepted() {
        let mut state = ReconcilerState::new();
        state.apply_frame(&progress_frame(7.0), Instant::now());
        assert_eq!(state.displayed_progress, 7.0);
    }

    #[test]
    fn small_update_within_interval_is_dropped() {
        let mut state = ReconcilerState::new();
        let t0 = Instant::now();
        state.apply_frame(&progress_frame(55.0), t0);
        // 400ms later, 2 points of movement: inside interval, not past delta
        state.apply_frame(&progress_frame(57.0), t0 + Duration::from_millis(400));
        assert_eq!(state.displayed_progress, 55.0);
    }

    #[test]
    fn large_jump_within_interval_is_accepted() {
        let mut state = ReconcilerState::new();
        let t0 = Instant::now();
        state.apply_frame(&progress_frame(55.0), t0);
        state.apply_frame(&progress_frame(58.0), t0 + Duration::from_millis(400));
        assert_eq!(state.displayed_progress, 58.0);
    }

    #[test]
    fn small_update_after_interval_is_accepted() {
        let mut state = ReconcilerState::new();
        let t0 = Instant::now();
        state.apply_frame(&progress_frame(55.0), t0);
        state.apply_frame(&progress_frame(56.0), t0 + Duration::from_secs(1));
        assert_eq!(state.displayed_progress, 56.0);
    }

    #[test]
    fn dropped_update_does_not_reset_the_throttle_window() {
        let mut state = ReconcilerState::new();
        let t0 = Instant::now();
        state.apply_frame(&progress_frame(55.0), t0);
        state.apply_frame(&progress_frame(56.0), t0 + Duration::from_millis(500));
        assert_eq!(state.displayed_progress, 55.0);
        // Window measures from the last ACCEPTED value
        state.apply_frame(&progress_frame(56.5), t0 + Duration::from_secs(1));
        assert_eq!(state.displayed_progress, 56.5);
    }

    #[test]
    fn ticks_predict_progress_from_estimate() {
        let mut state = ReconcilerState::new();
        state.apply_frame(
            &ProgressFrame::Progress(ProgressUpdate {
                estimated_seconds: Some(50.0),
                ..Default::default()
            }),
            Instant::now(),
        );
        for _ in 0..5 {
            state.apply_tick();
        }
        assert_eq!(state.displayed_progress, 10.0);
    }

    #[test]
    fn prediction_never_moves_the_bar_backwards() {
        let mut state = ReconcilerState::new();
        state.apply_frame(
            &ProgressFrame::Progress(ProgressUpdate {
                progress: Some(60.0),
                estimated_seconds: Some(100.0),
                ..Default::default()
            }),
            Instant::now(),
        );
        state.apply_tick();
        assert_eq!(state.displayed_progress, 60.0);
    }

    #[test]
    fn prediction_caps_at_one_hundred() {
        let mut state = ReconcilerState::new();
        state.apply_frame(
            &ProgressFrame::Progress(ProgressUpdate {
                estimated_seconds: Some(2.0),
                ..Default::default()
            }),
            Instant::now(),
        );
        for _ in 0..10 {
            state.apply_tick();
        }
        assert_eq!(state.displayed_progress, 100.0);
    }

    #[test]
    fn ticks_without_estimate_do_nothing() {
        let mut state = ReconcilerState::new();
        state.apply_tick();
        state.apply_tick();
        assert_eq!(state.displayed_progress, 0.0);
        assert_eq!(state.elapsed_seconds(), 2);
    }

    #[test]
    fn sparse_frames_merge_last_value_wins() {
        let mut state = ReconcilerState::new();
        let now = Instant::now();
        state.apply_frame(
            &ProgressFrame::Progress(ProgressUpdate {
                phase: Some(Phase::Transcribing),
                total_chunks: Some(4),
                current_chunk: Some(1),
                ..Default::default()
            }),
            now,
        );
        state.apply_frame(
            &ProgressFrame::Progress(ProgressUpdate {
                current_chunk: Some(2),
                words_processed: Some(12),
                ..Default::default()
            }),
            now + Duration::from_secs(2),
        );

        // Fields absent from the second frame keep their earlier values
        assert_eq!(state.phase, Some(Phase::Transcribing));
        assert_eq!(state.total_chunks, Some(4));
        assert_eq!(state.current_chunk, Some(2));
        assert_eq!(state.words_processed, Some(12));
    }

    #[test]
    fn result_frame_completes_the_state() {
        let mut state = ReconcilerState::new();
        let result = JobResult {
            transcription: "t".to_string(),
            summary: None,
            stats: JobStats {
                processing_time: 1.0,
                audio_duration: 2.0,
            },
            error: None,
        };
        state.apply_frame(&ProgressFrame::Result(result.clone()), Instant::now());

        assert!(state.is_done());
        assert_eq!(state.displayed_progress, 100.0);
        assert_eq!(state.outcome, Some(JobOutcome::Completed(Box::new(result))));

        // Done states ignore further ticks
        state.apply_tick();
        assert_eq!(state.elapsed_seconds(), 0);
    }

    #[test]
    fn error_frame_fails_the_state() {
        let mut state = ReconcilerState::new();
        state.apply_frame(
            &ProgressFrame::Error {
                error: "it broke".to_string(),
            },
            Instant::now(),
        );
        assert_eq!(state.phase, Some(Phase::Error));
        assert_eq!(state.outcome, Some(JobOutcome::Failed("it broke".to_string())));
    }
}
