//! Remote speech-to-text adapter.
//!
//! A chunk of PCM samples goes out over HTTP, text comes back. The trait is
//! the seam the dispatcher works against, so tests can script outcomes per
//! chunk without a network.

use crate::error::{Result, WhisprError};
use async_trait::async_trait;
use serde::Deserialize;

/// Transcribes one chunk of 16 kHz mono i16 PCM.
#[async_trait]
pub trait SegmentTranscriber: Send + Sync {
    /// Transcribes `samples`; `chunk_index` identifies the chunk for logging.
    async fn transcribe(&self, chunk_index: usize, samples: &[i16]) -> Result<String>;
}

/// HTTP client for a whisper-style transcription endpoint.
///
/// The request body is `{"audio": [..]}` with the PCM encoded as
/// little-endian bytes, each byte a JSON number.
pub struct RemoteWhisperTranscriber {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: String,
}

impl RemoteWhisperTranscriber {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl SegmentTranscriber for RemoteWhisperTranscriber {
    async fn transcribe(&self, chunk_index: usize, samples: &[i16]) -> Result<String> {
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        log::debug!(
            "Sending chunk {} ({} bytes) to {}",
            chunk_index,
            bytes.len(),
            self.endpoint
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "audio": bytes }));
        if let Some(key) = &self.api_key {
            request = request.header(crate::defaults::API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| {
            WhisprError::SegmentTranscription {
                message: format!("chunk {}: request failed: {}", chunk_index, e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhisprError::SegmentTranscription {
                message: format!("chunk {}: backend returned {}: {}", chunk_index, status, body),
            });
        }

        let parsed: TranscribeResponse =
            response
                .json()
                .await
                .map_err(|e| WhisprError::SegmentTranscription {
                    message: format!("chunk {}: malformed response: {}", chunk_index, e),
                })?;
        Ok(parsed.text)
    }
}

pub use mock::MockSegmentTranscriber;

mod mock {
    // Test support; mutex poisoning aborts the test anyway
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted transcriber for tests. Outcomes are keyed by chunk index.
    pub struct MockSegmentTranscriber {
        outcomes: HashMap<usize, std::result::Result<String, String>>,
        delay: Option<Duration>,
        active: AtomicUsize,
        max_active: AtomicUsize,
        calls: Mutex<Vec<usize>>,
    }

    impl Default for MockSegmentTranscriber {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSegmentTranscriber {
        pub fn new() -> Self {
            Self {
                outcomes: HashMap::new(),
                delay: None,
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_text(mut self, chunk_index: usize, text: &str) -> Self {
            self.outcomes.insert(chunk_index, Ok(text.to_string()));
            self
        }

        pub fn with_failure(mut self, chunk_index: usize, message: &str) -> Self {
            self.outcomes.insert(chunk_index, Err(message.to_string()));
            self
        }

        /// Holds each call open long enough for batch-mates to overlap.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Highest number of calls observed in flight at once.
        pub fn max_in_flight(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }

        pub fn calls(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SegmentTranscriber for MockSegmentTranscriber {
        async fn transcribe(&self, chunk_index: usize, _samples: &[i16]) -> Result<String> {
            self.calls.lock().unwrap().push(chunk_index);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);

            match self.outcomes.get(&chunk_index) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(message)) => Err(WhisprError::SegmentTranscription {
                    message: message.clone(),
                }),
                None => Err(WhisprError::SegmentTranscription {
                    message: format!("chunk {}: no scripted outcome", chunk_index),
                }),
            }
        }
    }
}
