//! Locally stored API key and résumé

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::FillerConfig;

/// Key-value record read by every fill run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_text: Option<String>,
    /// Free-form notes sent along with the résumé
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    /// `data:<mime>;base64,<payload>` URL of the original résumé file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Decoded résumé file ready to attach to an upload control
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl StoredProfile {
    /// Non-blank API key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Non-blank résumé text
    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Non-blank additional information
    pub fn additional_info(&self) -> Option<&str> {
        self.additional_info.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Résumé text as the model sees it, with any additional information appended
    pub fn full_resume_text(&self) -> Option<String> {
        let resume = self.resume_text()?.trim();
        Some(match self.additional_info() {
            Some(info) => format!("{}\n\nAdditional Information:\n{}", resume, info),
            None => resume.to_string(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key().is_some() && self.resume_text().is_some()
    }

    /// Decode the stored résumé file, `None` when no file was stored
    pub fn resume_file(&self) -> Result<Option<ResumeFile>> {
        let Some(data_url) = self.resume_file_data.as_deref() else {
            return Ok(None);
        };
        let (header_mime, bytes) = decode_data_url(data_url)?;
        let mime_type = self
            .resume_file_type
            .clone()
            .filter(|t| !t.is_empty())
            .or(header_mime)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let name = self
            .resume_file_name
            .clone()
            .unwrap_or_else(|| "resume".to_string());
        Ok(Some(ResumeFile {
            name,
            mime_type,
            bytes,
        }))
    }

    /// Store a résumé file as a data URL
    pub fn set_resume_file(&mut self, name: &str, mime_type: &str, bytes: &[u8]) {
        self.resume_file_data = Some(encode_data_url(mime_type, bytes));
        self.resume_file_name = Some(name.to_string());
        self.resume_file_type = Some(mime_type.to_string());
    }
}

/// Build a `data:` URL with a base64 payload
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type (if any) and decoded bytes.
/// A bare base64 string without header is accepted too.
pub fn decode_data_url(data_url: &str) -> Result<(Option<String>, Vec<u8>)> {
    let (mime, payload) = match data_url.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .context("Malformed data URL: missing ','")?;
            let mime = header
                .trim_end_matches(";base64")
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, payload)
        }
        None => (None, data_url),
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .context("Résumé file payload is not valid base64")?;
    Ok((mime, bytes))
}

/// Reads and writes the profile JSON file
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Store at `~/.jobfill/profile.json`
    pub fn new() -> Result<Self> {
        let dir = FillerConfig::home_dir()?;
        Ok(Self::with_path(dir.join("profile.json")))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        ProfileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the profile, or an empty one if nothing was saved yet
    pub fn load(&self) -> Result<StoredProfile> {
        if !self.path.exists() {
            debug!("No profile at {}", self.path.display());
            return Ok(StoredProfile::default());
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile {}", self.path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid profile {}", self.path.display()))
    }

    pub fn save(&self, profile: &StoredProfile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut profile = profile.clone();
        profile.updated_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&profile)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write profile {}", self.path.display()))?;
        info!("Saved profile to {}", self.path.display());
        Ok(())
    }

    /// Load, change and save in one step
    pub fn update(&self, change: impl FnOnce(&mut StoredProfile)) -> Result<StoredProfile> {
        let mut profile = self.load()?;
        change(&mut profile);
        self.save(&profile)?;
        Ok(profile)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Deleted profile {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;
