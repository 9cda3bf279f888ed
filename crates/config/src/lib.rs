//! Configuration loading, validation, and management for quill.
//!
//! Loads configuration from `~/.quill/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.quill/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used by the decision service
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per decision-service response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum decision-service round trips per utterance
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Tool bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Configuration for the MCP tool-bridge subprocess.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Command that starts the tool peer (e.g., path to an MCP server binary)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments passed to the command
    #[serde(default)]
    pub args: Vec<String>,

    /// Logical sheet/resource identifier, forwarded to the child as
    /// `SHEET_ID`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,

    /// Ambient environment variables forwarded to the child verbatim.
    /// Everything else is withheld from the subprocess.
    #[serde(default = "default_pass_env")]
    pub pass_env: Vec<String>,

    /// Literal environment values set on the child
    #[serde(default)]
    pub env: HashMap<String, String>,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_turns() -> u32 {
    10
}
fn default_pass_env() -> Vec<String> {
    vec!["PATH".into(), "HOME".into()]
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_turns", &self.max_turns)
            .field("bridge", &self.bridge)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_turns: default_max_turns(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: vec![],
            sheet_id: None,
            pass_env: default_pass_env(),
            env: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path with environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment variable overrides (highest priority).
    ///
    /// The lookup is injected so the precedence rules are testable without
    /// mutating the process environment.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("QUILL_API_KEY").or_else(|| lookup("ANTHROPIC_API_KEY"));
        }

        if let Some(model) = lookup("QUILL_MODEL") {
            self.model = model;
        }

        if let Some(command) = lookup("QUILL_SERVER_COMMAND") {
            self.bridge.command = Some(command);
        }

        if let Some(sheet_id) = lookup("QUILL_SHEET_ID") {
            self.bridge.sheet_id = Some(sheet_id);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".quill")
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "max_turns must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
