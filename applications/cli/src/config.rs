/// CLI configuration
use crate::error::{CliError, Result};
use chant_api_client::ApiConfig;
use chant_playback::{LoopMode, PlayerConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "chant.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub resume: ResumeSettings,

    #[serde(default)]
    pub share: ShareSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Catalog API base URL
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Initial volume, 0-100
    #[serde(default = "default_volume")]
    pub volume: u8,

    #[serde(default = "default_locator_schemes")]
    pub locator_schemes: Vec<String>,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Give up on URL resolution after this many seconds
    #[serde(default)]
    pub resolve_timeout_secs: Option<u64>,

    #[serde(default)]
    pub loop_mode: LoopMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResumeSettings {
    #[serde(default = "default_resume_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShareSettings {
    /// Public page that share links point at
    #[serde(default = "default_share_base_url")]
    pub base_url: String,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `chant.toml` is read when
    /// present. Environment variables prefixed `CHANT_` override the file,
    /// with `__` between section and key (`CHANT_API__ENDPOINT`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CHANT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("playback.locator_schemes"),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            return Err(CliError::Config(
                "API endpoint is required (set CHANT_API__ENDPOINT)".to_string(),
            ));
        }

        if self.playback.volume > 100 {
            return Err(CliError::Config(format!(
                "Volume must be between 0 and 100, got {}",
                self.playback.volume
            )));
        }

        if self.playback.locator_schemes.is_empty() {
            return Err(CliError::Config(
                "At least one locator scheme is required".to_string(),
            ));
        }

        if self.playback.resolve_timeout_secs == Some(0) {
            return Err(CliError::Config(
                "Resolve timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.endpoint.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            locator_schemes: self.playback.locator_schemes.clone(),
            volume: self.playback.volume,
            loop_mode: self.playback.loop_mode,
            max_retries: self.playback.max_retries,
            resolve_timeout: self.playback.resolve_timeout_secs.map(Duration::from_secs),
            ..PlayerConfig::default()
        }
    }
}

// Default values
fn default_api_timeout() -> u64 {
    30
}

fn default_volume() -> u8 {
    100
}

fn default_locator_schemes() -> Vec<String> {
    vec![chant_core::DEFAULT_SCHEME.to_string()]
}

fn default_max_retries() -> u32 {
    3
}

fn default_resume_path() -> PathBuf {
    PathBuf::from(".chant/resume.json")
}

fn default_share_base_url() -> String {
    "http://localhost:5173/".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            locator_schemes: default_locator_schemes(),
            max_retries: default_max_retries(),
            resolve_timeout_secs: None,
            loop_mode: LoopMode::default(),
        }
    }
}

impl Default for ResumeSettings {
    fn default() -> Self {
        Self {
            path: default_resume_path(),
        }
    }
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            base_url: default_share_base_url(),
        }
    }
}
