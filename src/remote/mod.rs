//! HTTP adapters for the transcription and summarization backends.

pub mod summarizer;
pub mod transcriber;

pub use summarizer::{MockSummarizer, RemoteSummarizer, Summarizer};
pub use transcriber::{MockSegmentTranscriber, RemoteWhisperTranscriber, SegmentTranscriber};
