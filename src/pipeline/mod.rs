//! Transcription pipeline: planning, bounded dispatch, assembly,
//! orchestration.

pub mod assembler;
pub mod dispatcher;
pub mod job;
pub mod planner;

pub use assembler::assemble;
pub use dispatcher::{BoundedDispatcher, ChunkOutcome};
pub use job::{JobResult, JobStats, TranscriptionJob};
pub use planner::{plan, ChunkDescriptor, PlannerConfig};
