//! Client side: upload a file to a whispr server and follow the progress
//! stream until a terminal frame.
//!
//! The whole request runs under one wall-clock timeout. Timing out abandons
//! the client's view of the job; the server keeps processing.

use crate::defaults;
use crate::error::{Result, WhisprError};
use crate::progress::frame::FrameDecoder;
use crate::progress::reconciler::{JobOutcome, ReconcilerState};
use futures_util::{Stream, StreamExt};
use std::time::{Duration, Instant};

/// HTTP client for a remote whispr upload endpoint.
pub struct Client {
    http: reqwest::Client,
    server_url: String,
    api_key: String,
}

impl Client {
    pub fn new(server_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server_url: server_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Uploads a file and returns the raw progress byte stream.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<impl Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        log::info!("Uploading {:?} to {}", file_name, self.server_url);
        let response = self
            .http
            .post(&self.server_url)
            .header(defaults::API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WhisprError::Other(format!(
                "server returned {}: {}",
                status, body
            )));
        }
        Ok(Box::pin(response.bytes_stream()))
    }
}

/// Follows a progress byte stream to its terminal frame.
///
/// A local 1 Hz clock drives predicted progress between frames; `on_update`
/// fires after every state change so a renderer can redraw. A stream that
/// ends without a terminal frame is a `StreamParse` error.
pub async fn follow_stream<S, B, E>(
    mut stream: S,
    mut on_update: impl FnMut(&ReconcilerState),
) -> Result<JobOutcome>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = FrameDecoder::new();
    let mut state = ReconcilerState::new();
    // First tick lands a full second in, not immediately
    let mut clock = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );

    loop {
        tokio::select! {
            piece = stream.next() => {
                match piece {
                    Some(Ok(bytes)) => {
                        for frame in decoder.feed(bytes.as_ref())? {
                            state.apply_frame(&frame, Instant::now());
                            on_update(&state);
                        }
                        if state.is_done() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        return Err(WhisprError::StreamParse {
                            message: format!("stream failed: {}", e),
                        });
                    }
                    None => {
                        if state.is_done() {
                            break;
                        }
                        return Err(WhisprError::StreamParse {
                            message: "stream ended before a terminal frame".to_string(),
                        });
                    }
                }
            }
            _ = clock.tick() => {
                state.apply_tick();
                on_update(&state);
            }
        }
    }

    match state.outcome {
        Some(outcome) => Ok(outcome),
        None => Err(WhisprError::StreamParse {
            message: "stream ended before a terminal frame".to_string(),
        }),
    }
}

/// Bounds one whole client operation, upload included, by a wall-clock
/// timeout. Expiry surfaces as the distinct timeout error; the server side
/// keeps processing.
pub async fn with_timeout<T>(
    timeout: Duration,
    operation: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, operation)
        .await
        .map_err(|_| WhisprError::Timeout {
            seconds: timeout.as_secs(),
        })?
}
