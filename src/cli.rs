//! Command-line interface for whispr
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Chunked audio transcription and summarization
#[derive(Parser, Debug)]
#[command(
    name = "whispr",
    version,
    about = "Chunked audio transcription and summarization"
)]
pub struct Cli {
    /// Audio file to process (reads WAV from stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Upload to a remote whispr server instead of processing locally
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Summarization API key (overrides WHISPR_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Transcription endpoint override
    #[arg(long, value_name = "URL")]
    pub transcribe_url: Option<String>,

    /// Summarization endpoint override
    #[arg(long, value_name = "URL")]
    pub summarize_url: Option<String>,

    /// Chunk duration (default: 30s). Examples: 30s, 45s, 2m
    #[arg(long, short = 'c', value_name = "DURATION", value_parser = parse_secs)]
    pub chunk_size: Option<u64>,

    /// Maximum concurrent chunk requests
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Overall client timeout (default: 5m). Examples: 300s, 5m, 1h
    #[arg(long, value_name = "DURATION", value_parser = parse_secs)]
    pub timeout: Option<u64>,

    /// Skip the summarization phase
    #[arg(long)]
    pub no_summary: bool,

    /// Print raw progress frames instead of rendering them
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output (quiet mode)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`).
fn parse_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secs_accepts_bare_numbers() {
        assert_eq!(parse_secs("30"), Ok(30));
    }

    #[test]
    fn parse_secs_accepts_humantime_formats() {
        assert_eq!(parse_secs("45s"), Ok(45));
        assert_eq!(parse_secs("2m"), Ok(120));
        assert_eq!(parse_secs("1h30m"), Ok(5400));
    }

    #[test]
    fn parse_secs_rejects_garbage() {
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn cli_parses_server_mode_args() {
        let cli = Cli::parse_from([
            "whispr",
            "talk.wav",
            "--server",
            "http://localhost:5000/upload",
            "--api-key",
            "k",
            "--timeout",
            "5m",
        ]);
        assert_eq!(cli.file.as_deref(), Some(std::path::Path::new("talk.wav")));
        assert_eq!(cli.server.as_deref(), Some("http://localhost:5000/upload"));
        assert_eq!(cli.timeout, Some(300));
    }

    #[test]
    fn cli_defaults_are_local_render_mode() {
        let cli = Cli::parse_from(["whispr", "talk.wav"]);
        assert!(cli.server.is_none());
        assert!(!cli.json);
        assert!(!cli.no_summary);
        assert_eq!(cli.verbose, 0);
    }
}
