//! Progress protocol: frame types, the producer-side emitter, and the
//! consumer-side reconciler.

pub mod emitter;
pub mod frame;
pub mod reconciler;

pub use emitter::{format_seconds, ProgressEmitter};
pub use frame::{FrameDecoder, LoadingStep, Phase, ProgressFrame, ProgressUpdate};
pub use reconciler::{JobOutcome, ReconcilerState};
