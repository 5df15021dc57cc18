//! Application entry points for the CLI binary.
//!
//! Two modes: local (the whole pipeline runs in-process against the remote
//! model endpoints) and client (the file is uploaded to a whispr server and
//! only the progress stream is consumed here). Both render through the same
//! reconciler-driven status line.

use crate::audio::AudioBuffer;
use crate::client::{follow_stream, with_timeout, Client};
use crate::config::Config;
use crate::error::WhisprError;
use crate::pipeline::job::{JobResult, TranscriptionJob};
use crate::progress::emitter::ProgressEmitter;
use crate::progress::reconciler::{JobOutcome, ReconcilerState};
use crate::remote::{RemoteSummarizer, RemoteWhisperTranscriber};
use crate::upload::run_streaming;
use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use owo_colors::OwoColorize;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Runs the full pipeline in-process and renders progress locally.
pub async fn run_local_command(
    config: Config,
    audio: AudioBuffer,
    api_key: Option<String>,
    no_summary: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let transcriber = RemoteWhisperTranscriber::new(
        &config.transcription.endpoint,
        config.transcription.api_key.clone(),
    );
    let summarizer = if no_summary {
        None
    } else {
        let key = api_key.context(
            "an API key is required for summarization; \
             pass --api-key, set WHISPR_API_KEY, or use --no-summary",
        )?;
        Some(RemoteSummarizer::from_config(&config.summarization, key))
    };
    let job = TranscriptionJob::new(transcriber, summarizer, &config);

    if json {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);
        let printer = tokio::spawn(async move {
            let mut stdout = std::io::stdout();
            while let Some(line) = line_rx.recv().await {
                // A closed stdout ends the render, not the job
                if stdout
                    .write_all(line.as_bytes())
                    .and_then(|()| stdout.flush())
                    .is_err()
                {
                    break;
                }
            }
        });
        let result = run_streaming(&job, &audio, line_tx).await;
        if printer.await.is_err() {
            log::warn!("Progress printer task panicked");
        }
        result?;
        return Ok(());
    }

    let (frame_tx, mut frame_rx) = mpsc::channel(32);
    let emitter = ProgressEmitter::new(frame_tx);
    let runner = tokio::spawn(async move { job.run(&audio, &emitter).await });

    let mut state = ReconcilerState::new();
    let mut clock = tokio::time::interval_at(
        tokio::time::Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );
    loop {
        tokio::select! {
            frame = frame_rx.recv() => match frame {
                Some(frame) => {
                    state.apply_frame(&frame, Instant::now());
                    render_status(&state, quiet);
                    if state.is_done() {
                        break;
                    }
                }
                None => break,
            },
            _ = clock.tick() => {
                state.apply_tick();
                render_status(&state, quiet);
            }
        }
    }
    finish_status_line(quiet);

    let result = runner.await.context("pipeline task panicked")??;
    print_result(&result);
    Ok(())
}

/// Uploads to a remote server and follows its progress stream.
pub async fn run_client_command(
    config: Config,
    server_url: String,
    file_name: String,
    bytes: Vec<u8>,
    api_key: Option<String>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let key = api_key.context("an API key is required; pass --api-key or set WHISPR_API_KEY")?;
    let client = Client::new(server_url, key);
    let timeout = Duration::from_secs(config.client.timeout_secs);

    // One budget covers the upload itself and the whole progress stream
    let outcome = with_timeout(timeout, async {
        let stream = client.upload(&file_name, bytes).await?;
        if json {
            let mut stream = stream;
            let mut stdout = std::io::stdout();
            while let Some(piece) = stream.next().await {
                let piece = piece?;
                stdout.write_all(piece.as_ref()).map_err(WhisprError::Io)?;
                stdout.flush().map_err(WhisprError::Io)?;
            }
            return Ok(None);
        }
        follow_stream(stream, |state| render_status(state, quiet))
            .await
            .map(Some)
    })
    .await?;

    let Some(outcome) = outcome else {
        return Ok(());
    };
    finish_status_line(quiet);
    match outcome {
        JobOutcome::Completed(result) => {
            print_result(&result);
            Ok(())
        }
        JobOutcome::Failed(message) => bail!("processing failed: {message}"),
    }
}

/// Redraws the single-line status display on stderr.
fn render_status(state: &ReconcilerState, quiet: bool) {
    if quiet {
        return;
    }
    let status = state.status.as_deref().unwrap_or("Working...");
    eprint!(
        "\r\x1b[2K{} {}",
        format!("[{:>5.1}%]", state.displayed_progress).cyan(),
        status
    );
    std::io::stderr().flush().ok();
}

fn finish_status_line(quiet: bool) {
    if !quiet {
        eprintln!();
    }
}

fn print_result(result: &JobResult) {
    println!("{}", "Transcript".green().bold());
    println!("{}", result.transcription);
    if let Some(summary) = &result.summary {
        println!();
        println!("{}", "Summary".green().bold());
        println!("{}", summary);
    }
    if let Some(error) = &result.error {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }
    log::info!(
        "Processed {:.1}s of audio in {:.1}s",
        result.stats.audio_duration,
        result.stats.processing_time
    );
}
