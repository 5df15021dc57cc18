use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub chunking: ChunkingConfig,
    pub dispatch: DispatchConfig,
    pub transcription: TranscriptionConfig,
    pub summarization: SummarizationConfig,
    pub client: ClientConfig,
}

/// Audio input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
}

/// Chunk planning configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_secs: u64,
    pub overlap_secs: u64,
    pub min_chunk_secs: u64,
}

/// Dispatch concurrency configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    pub max_concurrency: usize,
}

/// Remote recognition model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// Remote summarization model configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizationConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Client-side consumption configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_secs: defaults::CHUNK_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            min_chunk_secs: defaults::MIN_CHUNK_SECS,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::MAX_CONCURRENCY,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::TRANSCRIBE_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::SUMMARIZE_URL.to_string(),
            model: defaults::SUMMARY_MODEL.to_string(),
            max_tokens: defaults::SUMMARY_MAX_TOKENS,
            temperature: defaults::SUMMARY_TEMPERATURE,
            top_p: defaults::SUMMARY_TOP_P,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::CLIENT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - WHISPR_API_KEY → transcription.api_key
    /// - WHISPR_TRANSCRIBE_URL → transcription.endpoint
    /// - WHISPR_SUMMARIZE_URL → summarization.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("WHISPR_API_KEY") {
            if !key.is_empty() {
                self.transcription.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("WHISPR_TRANSCRIBE_URL") {
            if !url.is_empty() {
                self.transcription.endpoint = url;
            }
        }
        if let Ok(url) = std::env::var("WHISPR_SUMMARIZE_URL") {
            if !url.is_empty() {
                self.summarization.endpoint = url;
            }
        }
        self
    }

    /// Default configuration file path: `~/.config/whispr/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("whispr")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_constants() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.chunking.chunk_secs, 30);
        assert_eq!(config.chunking.overlap_secs, 1);
        assert_eq!(config.dispatch.max_concurrency, 3);
        assert_eq!(config.summarization.max_tokens, 500);
        assert_eq!(config.client.timeout_secs, 300);
    }

    #[test]
    fn load_parses_partial_file_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[chunking]\nchunk_secs = 15\n\n[dispatch]\nmax_concurrency = 5"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.chunking.chunk_secs, 15);
        assert_eq!(config.dispatch.max_concurrency, 5);
        // Untouched sections keep defaults
        assert_eq!(config.chunking.overlap_secs, 1);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chunking = not valid").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn load_or_default_returns_defaults_for_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/whispr.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_or_default_propagates_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[[").unwrap();
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, parsed);
    }
}
