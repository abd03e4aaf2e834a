//! content-rs: a file-backed content repository
//!
//! Documents live in one directory per collection under a content root.
//! Each document is front-matter plus a markdown body, rendered to HTML
//! through a node-transform pipeline and returned as typed, sorted
//! collections.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

use anyhow::Result;
use std::path::Path;

pub use content::ContentRepository;
pub use error::{ContentError, MarkupError};

/// A content site: configuration plus resolved directories
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content root
    pub content_dir: std::path::PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `cms.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("cms.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Build a repository over the content root
    pub fn repository(&self) -> Result<ContentRepository> {
        let timezone = self.config.timezone()?;
        Ok(ContentRepository::new(self.content_dir.clone())
            .with_renderer(content::MarkdownRenderer::with_options(
                &self.config.markdown,
            ))
            .with_normalizer(helpers::DateNormalizer::new(timezone))
            .with_excerpt_length(self.config.excerpt_length))
    }

    /// Load the site settings singleton
    pub fn settings(&self) -> Result<config::SiteSettings> {
        config::SiteSettings::load(self.content_dir.join(&self.config.settings_file))
    }
}
