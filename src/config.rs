//! Application configuration, read from a TOML file

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::FileKeyValueStore;
use crate::study::{RetryPolicy, StudyOptions};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where records are stored. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub assistant: AssistantConfig,
    pub study: StudyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "info".to_string(),
            assistant: AssistantConfig::default(),
            study: StudyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str(&content)?)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileKeyValueStore::default_data_dir().map_err(|_| ConfigError::DataDirNotFound),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model for generation, transcription and chat
    pub model: String,
    pub speech_model: String,
    pub voice: String,
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Kore".to_string(),
            timeout_secs: 120,
        }
    }
}

impl AssistantConfig {
    /// The configured key, else the one from the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub shuffle: bool,
    pub near_retry_min: usize,
    pub near_retry_spread: usize,
    pub far_retry_offset: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            shuffle: false,
            near_retry_min: policy.near_retry_min,
            near_retry_spread: policy.near_retry_spread,
            far_retry_offset: policy.far_retry_offset,
        }
    }
}

impl StudyConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            near_retry_min: self.near_retry_min,
            near_retry_spread: self.near_retry_spread,
            far_retry_offset: self.far_retry_offset,
        }
    }

    pub fn default_options(&self) -> StudyOptions {
        StudyOptions {
            shuffle: self.shuffle,
            swap_sides: false,
        }
    }
}
