//! Progress-event wire protocol.
//!
//! One job produces an ordered, append-only sequence of frames. Each
//! `progress` frame is a sparse patch carrying only the fields that changed;
//! the receiver merges frames last-value-wins into an accumulated view. The
//! stream terminates with a single `result` or `error` frame.
//!
//! Wire encoding is UTF-8 text lines, each blank or `data: <json>`.

use crate::error::{Result, WhisprError};
use crate::pipeline::job::JobResult;
use serde::{Deserialize, Serialize};

/// Pipeline phase reported to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Loading,
    Transcribing,
    Summarizing,
    Complete,
    Error,
}

/// Sub-step within the loading phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStep {
    Model,
    Audio,
    Config,
    Complete,
}

/// Sparse progress patch. Absent fields are unchanged on the receiver.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<LoadingStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Authoritative percentage, 0..=100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Number of chunks settled so far (1-based count).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_chunk: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
    /// Cumulative word count over successful chunk text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words_processed: Option<usize>,
    /// Audio duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_duration: Option<f64>,
    /// Up-front estimate of total processing seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_seconds: Option<f64>,
    /// Seconds spent transcribing so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time_remaining: Option<f64>,
}

/// One discrete status update sent from producer to consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressFrame {
    /// Sparse status patch during an active job.
    Progress(ProgressUpdate),
    /// Terminal frame carrying the full job result.
    Result(JobResult),
    /// Terminal failure frame.
    Error { error: String },
}

impl ProgressFrame {
    /// Serialize frame to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize frame from JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Encodes this frame as one wire line, `data: <json>` plus a blank line.
    pub fn encode_line(&self) -> Result<String> {
        let json = self
            .to_json()
            .map_err(|e| WhisprError::Other(format!("Failed to encode frame: {}", e)))?;
        Ok(format!("data: {}\n\n", json))
    }

    /// Returns true for `result` and `error` frames.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressFrame::Result(_) | ProgressFrame::Error { .. })
    }
}

/// Incremental decoder for the `data: <json>` line protocol.
///
/// Bytes arrive in arbitrary network-sized pieces; the decoder buffers
/// partial lines across calls and yields frames as complete lines appear.
/// Blank lines are skipped. A line whose payload is not valid JSON is a
/// `StreamParse` error; the receiving job is considered failed at that point.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a byte piece, returning every frame completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<ProgressFrame>> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = std::str::from_utf8(&line[..newline])
                .map_err(|e| WhisprError::StreamParse {
                    message: format!("Frame is not valid UTF-8: {}", e),
                })?
                .trim();

            if line.is_empty() {
                continue;
            }
            if let Some(payload) = line.strip_prefix("data: ") {
                let frame =
                    ProgressFrame::from_json(payload).map_err(|e| WhisprError::StreamParse {
                        message: e.to_string(),
                    })?;
                frames.push(frame);
            }
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::job::JobStats;

    #[test]
    fn progress_frame_serializes_sparse_fields_only() {
        let frame = ProgressFrame::Progress(ProgressUpdate {
            phase: Some(Phase::Transcribing),
            current_chunk: Some(2),
            total_chunks: Some(4),
            ..Default::default()
        });
        let json = frame.to_json().unwrap();

        assert!(json.contains(r#""type":"progress""#));
        assert!(json.contains(r#""phase":"transcribing""#));
        assert!(json.contains(r#""currentChunk":2"#));
        assert!(json.contains(r#""totalChunks":4"#));
        // Unset fields are absent, not null
        assert!(!json.contains("wordsProcessed"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn loading_frame_carries_step() {
        let frame = ProgressFrame::Progress(ProgressUpdate {
            phase: Some(Phase::Loading),
            step: Some(LoadingStep::Config),
            estimated_seconds: Some(50.0),
            ..Default::default()
        });
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""step":"config""#));
        assert!(json.contains(r#""estimatedSeconds":50.0"#));
    }

    #[test]
    fn result_frame_roundtrips() {
        let frame = ProgressFrame::Result(JobResult {
            transcription: "hello world".to_string(),
            summary: Some("greeting".to_string()),
            stats: JobStats {
                processing_time: 12.5,
                audio_duration: 100.0,
            },
            error: None,
        });
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""type":"result""#));
        assert!(json.contains(r#""processing_time":12.5"#));

        let decoded = ProgressFrame::from_json(&json).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn error_frame_roundtrips() {
        let frame = ProgressFrame::Error {
            error: "it broke".to_string(),
        };
        let json = frame.to_json().unwrap();
        assert_eq!(json, r#"{"type":"error","error":"it broke"}"#);
        assert_eq!(ProgressFrame::from_json(&json).unwrap(), frame);
    }

    #[test]
    fn encode_line_wraps_json_in_data_prefix() {
        let frame = ProgressFrame::Error {
            error: "x".to_string(),
        };
        let line = frame.encode_line().unwrap();
        assert!(line.starts_with("data: {"));
        assert!(line.ends_with("}\n\n"));
    }

    #[test]
    fn decoder_parses_complete_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder
            .feed(b"data: {\"type\":\"progress\",\"phase\":\"init\"}\n\n")
            .unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0],
            ProgressFrame::Progress(ProgressUpdate {
                phase: Some(Phase::Init),
                ..Default::default()
            })
        );
    }

    #[test]
    fn decoder_buffers_partial_lines_across_feeds() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"err").unwrap().is_empty());
        assert!(decoder.feed(b"or\",\"error\":\"boom\"").unwrap().is_empty());
        let frames = decoder.feed(b"}\n").unwrap();
        assert_eq!(
            frames,
            vec![ProgressFrame::Error {
                error: "boom".to_string()
            }]
        );
    }

    #[test]
    fn decoder_yields_multiple_frames_from_one_piece() {
        let mut decoder = FrameDecoder::new();
        let bytes = b"data: {\"type\":\"progress\"}\n\ndata: {\"type\":\"progress\",\"progress\":50.0}\n\n";
        let frames = decoder.feed(bytes).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn decoder_skips_blank_and_non_data_lines() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder
            .feed(b"\n\n: keep-alive comment\ndata: {\"type\":\"progress\"}\n")
            .unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn decoder_rejects_invalid_json_payload() {
        let mut decoder = FrameDecoder::new();
        let result = decoder.feed(b"data: {not json}\n");
        assert!(matches!(result, Err(WhisprError::StreamParse { .. })));
    }

    #[test]
    fn decoder_is_restartable_after_drain() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"data: {\"type\":\"progress\"}\n").unwrap();
        // A fresh complete line after the buffer drained parses cleanly
        let frames = decoder.feed(b"data: {\"type\":\"progress\"}\n").unwrap();
        assert_eq!(frames.len(), 1);
    }
}
