//! Repository configuration (cms.yml)

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub content_dir: String,
    /// Site settings file, relative to the content directory
    pub settings_file: String,

    // Locale
    pub language: String,
    pub timezone: String,

    // Writing
    pub date_format: String,
    pub excerpt_length: usize,
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            settings_file: "settings.yaml".to_string(),

            language: "de-CH".to_string(),
            timezone: "UTC".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            excerpt_length: 160,
            markdown: MarkdownConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Time zone used to read dates written without an offset
    pub fn timezone(&self) -> Result<Tz> {
        let name = self.timezone.trim();
        if name.is_empty() {
            return Ok(Tz::UTC);
        }
        name.parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", name, e))
    }
}

/// Markdown rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Highlight code fences with syntect
    pub highlight: bool,
    pub theme: String,
    pub line_numbers: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            highlight: false,
            theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}
