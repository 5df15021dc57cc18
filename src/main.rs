use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::Path;
use whispr::app::{run_client_command, run_local_command};
use whispr::audio::AudioBuffer;
use whispr::cli::Cli;
use whispr::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?.with_env_overrides();
    apply_cli_overrides(&mut config, &cli);
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| config.transcription.api_key.clone());

    let (file_name, bytes) = read_input(cli.file.as_deref())?;

    match cli.server.clone() {
        Some(server_url) => {
            run_client_command(
                config, server_url, file_name, bytes, api_key, cli.json, cli.quiet,
            )
            .await
        }
        None => {
            let audio = AudioBuffer::from_wav_bytes(&bytes)
                .with_context(|| format!("failed to decode {}", file_name))?;
            run_local_command(config, audio, api_key, cli.no_summary, cli.json, cli.quiet).await
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        // An explicitly named file must exist
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display())),
        None => Config::load_or_default(&Config::default_path()),
    }
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(chunk_secs) = cli.chunk_size {
        config.chunking.chunk_secs = chunk_secs;
    }
    if let Some(concurrency) = cli.concurrency {
        config.dispatch.max_concurrency = concurrency;
    }
    if let Some(timeout_secs) = cli.timeout {
        config.client.timeout_secs = timeout_secs;
    }
    if let Some(url) = &cli.transcribe_url {
        config.transcription.endpoint = url.clone();
    }
    if let Some(url) = &cli.summarize_url {
        config.summarization.endpoint = url.clone();
    }
}

/// Reads the audio bytes from the named file, or WAV data piped to stdin.
fn read_input(path: Option<&Path>) -> Result<(String, Vec<u8>)> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audio.wav".to_string());
            Ok((name, bytes))
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read audio from stdin")?;
            Ok(("stdin.wav".to_string(), bytes))
        }
    }
}
