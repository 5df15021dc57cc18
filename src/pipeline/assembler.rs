//! Transcript assembler.
//!
//! Joins settled chunk outcomes into one transcript. Failed chunks are
//! dropped from the text; the job only fails outright when every chunk
//! failed, in which case all chunk errors are surfaced together.

use crate::error::{Result, WhisprError};
use crate::pipeline::dispatcher::ChunkOutcome;

/// Joins chunk outcomes into a whitespace-normalized transcript.
///
/// Outcomes may arrive in any order; the transcript follows chunk index
/// order regardless.
pub fn assemble(mut outcomes: Vec<ChunkOutcome>) -> Result<String> {
    outcomes.sort_by_key(|o| o.index());

    let mut texts = Vec::new();
    let mut errors = Vec::new();
    for outcome in &outcomes {
        match outcome {
            ChunkOutcome::Success { text, .. } => texts.push(text.as_str()),
            ChunkOutcome::Failure { index, error } => {
                errors.push(format!("chunk {}: {}", index, error));
            }
        }
    }

    if texts.is_empty() {
        return Err(WhisprError::TotalTranscriptionFailure { errors });
    }

    let joined = texts.join(" ");
    Ok(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}
