//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::types::Level;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub sports: Vec<SportSources>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// "groq" | "openai" — both speak the same chat-completions dialect.
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Override the provider's default chat-completions URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Minimum gap between extraction calls, milliseconds.
    #[serde(default)]
    pub min_request_interval_ms: Option<u64>,
    /// Ask the model for a 50-word summary when a record lacks one.
    #[serde(default)]
    pub fill_missing_summaries: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub database_path: String,
}

/// One sport's scraping targets.
#[derive(Debug, Deserialize, Clone)]
pub struct SportSources {
    pub name: String,
    pub sources: Vec<SourceSpec>,
}

/// A single source page, optionally tagged with a coarse level bucket
/// used as a post-filter on extracted records.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceSpec {
    pub url: String,
    #[serde(default)]
    pub bucket: Option<LevelBucket>,
}

/// Coarse pre-classification of a source page.
///
/// When present, only records whose extracted level falls inside the
/// bucket are persisted from that source.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LevelBucket {
    International,
    National,
    Local,
}

impl LevelBucket {
    pub fn allows(&self, level: Level) -> bool {
        match self {
            LevelBucket::International => matches!(level, Level::International),
            LevelBucket::National => matches!(level, Level::National | Level::State),
            LevelBucket::Local => matches!(
                level,
                Level::College | Level::School | Level::Club | Level::Corporate
            ),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
