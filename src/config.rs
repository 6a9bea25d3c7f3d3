//! Runtime settings: model list, API endpoint and pacing of the write pass.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models tried in order when drafting answers
pub const DEFAULT_MODELS: &[&str] = &["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.5-flash-lite"];

/// Models tried in order when extracting résumé text from a PDF
pub const DEFAULT_EXTRACTION_MODELS: &[&str] =
    &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash-exp"];

/// All tunables, loaded from `~/.jobfill/config.json` with environment overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerConfig {
    /// Base URL of the generateContent API, without trailing slash
    pub api_base: String,
    pub models: Vec<String>,
    pub extraction_models: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Limit applied to textareas and text inputs without `maxlength`
    pub default_text_limit: usize,
    /// Characters of page text sent as job context
    pub page_text_limit: usize,
    pub writer: WriterSettings,
}

impl Default for FillerConfig {
    fn default() -> Self {
        FillerConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            extraction_models: DEFAULT_EXTRACTION_MODELS.iter().map(|m| m.to_string()).collect(),
            temperature: 0.8,
            max_output_tokens: 4096,
            default_text_limit: 500,
            page_text_limit: 3000,
            writer: WriterSettings::default(),
        }
    }
}

/// Pacing of the write pass, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    /// Pause after each ordinary field
    pub field_delay_ms: u64,
    /// Pause after each Select2 search widget
    pub widget_delay_ms: u64,
    /// Wait between opening a search widget and typing into it
    pub widget_open_delay_ms: u64,
    /// Wait for search results to render before picking one
    pub widget_results_delay_ms: u64,
    /// Briefly tint written controls
    pub highlight: bool,
}

impl Default for WriterSettings {
    fn default() -> Self {
        WriterSettings {
            field_delay_ms: 200,
            widget_delay_ms: 1000,
            widget_open_delay_ms: 200,
            widget_results_delay_ms: 500,
            highlight: true,
        }
    }
}

impl WriterSettings {
    /// No pauses at all, for documents that don't run scripts
    pub fn immediate() -> Self {
        WriterSettings {
            field_delay_ms: 0,
            widget_delay_ms: 0,
            widget_open_delay_ms: 0,
            widget_results_delay_ms: 0,
            highlight: true,
        }
    }

    pub fn field_delay(&self) -> Duration {
        Duration::from_millis(self.field_delay_ms)
    }

    pub fn widget_delay(&self) -> Duration {
        Duration::from_millis(self.widget_delay_ms)
    }

    pub fn widget_open_delay(&self) -> Duration {
        Duration::from_millis(self.widget_open_delay_ms)
    }

    pub fn widget_results_delay(&self) -> Duration {
        Duration::from_millis(self.widget_results_delay_ms)
    }
}

impl FillerConfig {
    /// `~/.jobfill`, where the config and profile live
    pub fn home_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Unable to determine home directory")?;
        Ok(home_dir.join(".jobfill"))
    }

    /// Load `~/.jobfill/config.json` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::home_dir()?.join("config.json");
        let config = Self::load_from(&path)?;
        config.with_env_overrides()
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Apply `JOBFILL_API_BASE`, `JOBFILL_MODELS` and `JOBFILL_TEMPERATURE`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base) = std::env::var("JOBFILL_API_BASE") {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        if let Ok(models) = std::env::var("JOBFILL_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if models.is_empty() {
                anyhow::bail!("JOBFILL_MODELS must name at least one model");
            }
            self.models = models;
        }
        if let Ok(temperature) = std::env::var("JOBFILL_TEMPERATURE") {
            self.temperature = temperature
                .trim()
                .parse()
                .context("JOBFILL_TEMPERATURE must be a number")?;
        }
        Ok(self)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
