use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;

use jobfill::resume::{self, ImportedResume};
use jobfill::{FillerConfig, OutputFormat, ProfileStore};

use crate::commands::utils;

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show what is stored (the API key is masked)
    Show {
        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Store the Gemini API key
    SetKey {
        /// API key from https://aistudio.google.com/app/apikey
        key: String,
    },

    /// Store résumé text from a plain-text file
    SetResume {
        /// Path to a .txt file
        file: PathBuf,
    },

    /// Store notes sent with the résumé (pass an empty string to remove them)
    SetAdditionalInfo {
        /// Anything the résumé leaves out: availability, salary expectations, links
        text: String,
    },

    /// Store a résumé file (.txt or .pdf); PDFs are also attached to upload fields
    ImportResume {
        /// Path to the résumé
        file: PathBuf,

        /// Extract the text of a PDF with the model and store it as the résumé text
        #[arg(long)]
        extract: bool,
    },

    /// Delete the stored profile
    Clear,
}

pub async fn handle_profile(command: ProfileCommands) -> Result<()> {
    let store = ProfileStore::new()?;

    match command {
        ProfileCommands::Show { format } => {
            let profile = store.load()?;
            let key = profile.api_key().map(mask_key);
            let resume_chars = profile.resume_text().map(|t| t.chars().count());
            match format {
                OutputFormat::Json => utils::print_json(&json!({
                    "path": store.path(),
                    "apiKey": key,
                    "resumeChars": resume_chars,
                    "additionalInfo": profile.additional_info(),
                    "resumeFileName": profile.resume_file_name,
                    "resumeFileType": profile.resume_file_type,
                    "updatedAt": profile.updated_at,
                }))?,
                OutputFormat::Simple => {
                    println!("Profile: {}", store.path().display());
                    println!("API key: {}", key.as_deref().unwrap_or("(not set)"));
                    match resume_chars {
                        Some(n) => println!("Resume text: {} characters", n),
                        None => println!("Resume text: (not set)"),
                    }
                    match profile.additional_info() {
                        Some(info) => println!("Additional information: {} characters", info.chars().count()),
                        None => println!("Additional information: (not set)"),
                    }
                    match &profile.resume_file_name {
                        Some(name) => println!("Resume file: {}", name),
                        None => println!("Resume file: (none)"),
                    }
                }
            }
        }

        ProfileCommands::SetKey { key } => {
            let key = key.trim().to_string();
            if key.is_empty() {
                anyhow::bail!("API key must not be empty");
            }
            store.update(|profile| profile.api_key = Some(key))?;
            println!("API key saved");
        }

        ProfileCommands::SetResume { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            if text.trim().is_empty() {
                anyhow::bail!("{} is empty", file.display());
            }
            let chars = text.chars().count();
            store.update(|profile| profile.resume_text = Some(text))?;
            println!("Resume saved ({} characters)", chars);
        }

        ProfileCommands::SetAdditionalInfo { text } => {
            let text = text.trim().to_string();
            let cleared = text.is_empty();
            store.update(|profile| profile.additional_info = (!cleared).then_some(text))?;
            if cleared {
                println!("Additional information removed");
            } else {
                println!("Additional information saved");
            }
        }

        ProfileCommands::ImportResume { file, extract } => {
            let config = FillerConfig::load()?;
            match resume::import_resume(&file, &store, extract, &config).await? {
                ImportedResume::Text { chars } => println!("Resume saved ({} characters)", chars),
                ImportedResume::Pdf {
                    file_name,
                    extracted_chars: Some(chars),
                } => println!("Stored {} and extracted {} characters of text", file_name, chars),
                ImportedResume::Pdf { file_name, .. } => {
                    println!("Stored {} for upload fields", file_name)
                }
            }
        }

        ProfileCommands::Clear => {
            store.clear()?;
            println!("Profile cleared");
        }
    }

    Ok(())
}

/// Keep the last four characters of the key visible
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
