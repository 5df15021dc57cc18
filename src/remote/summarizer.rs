//! Remote summarization adapter.
//!
//! A single chat-completions request turns the assembled transcript into a
//! short summary. Failures here never fail the job; the pipeline degrades to
//! a transcript-only result.

use crate::defaults;
use crate::error::{Result, WhisprError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes audio transcriptions. \
     Keep the summary concise and focused on the main points.";

/// Produces a summary of a full transcript.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Chat-completions client for a Mistral-style endpoint.
pub struct RemoteSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl RemoteSummarizer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: defaults::SUMMARY_MODEL.to_string(),
            max_tokens: defaults::SUMMARY_MAX_TOKENS,
            temperature: defaults::SUMMARY_TEMPERATURE,
            top_p: defaults::SUMMARY_TOP_P,
        }
    }

    pub fn from_config(config: &crate::config::SummarizationConfig, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("Please summarize this transcription: {}", transcript),
                },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "top_p": self.top_p,
            "stream": false,
        });

        log::debug!(
            "Requesting summary of {} chars from {}",
            transcript.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| WhisprError::Summarization {
                message: format!("request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhisprError::Summarization {
                message: format!("backend returned {}: {}", status, body),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| WhisprError::Summarization {
                    message: format!("malformed response: {}", e),
                })?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WhisprError::Summarization {
                message: "response contained no choices".to_string(),
            })?;
        Ok(choice.message.content)
    }
}

pub use mock::MockSummarizer;

mod mock {
    // Test support; mutex poisoning aborts the test anyway
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Mutex;

    /// Scripted summarizer for tests.
    pub struct MockSummarizer {
        outcome: std::result::Result<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MockSummarizer {
        pub fn with_summary(summary: &str) -> Self {
            Self {
                outcome: Ok(summary.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_failure(message: &str) -> Self {
            Self {
                outcome: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Transcripts this mock was asked to summarize.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarizer for MockSummarizer {
        async fn summarize(&self, transcript: &str) -> Result<String> {
            self.requests.lock().unwrap().push(transcript.to_string());
            match &self.outcome {
                Ok(summary) => Ok(summary.clone()),
                Err(message) => Err(WhisprError::Summarization {
                    message: message.clone(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_summary_and_records_request() {
        let mock = MockSummarizer::with_summary("short version");
        let summary = mock.summarize("a very long transcript").await.unwrap();
        assert_eq!(summary, "short version");
        assert_eq!(mock.requests(), vec!["a very long transcript".to_string()]);
    }

    #[tokio::test]
    async fn mock_failure_maps_to_summarization_error() {
        let mock = MockSummarizer::with_failure("quota exceeded");
        let err = mock.summarize("t").await.unwrap_err();
        assert!(matches!(err, WhisprError::Summarization { .. }));
    }
}
