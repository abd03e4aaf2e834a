//! Render a single document file to HTML

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::Metadata;
use crate::Site;

/// Print the rendered HTML body of a document
pub fn run(site: &Site, file: &Path) -> Result<()> {
    let html = render_file(site, file)?;
    println!("{}", html);
    Ok(())
}

/// Split front-matter off `file` and render its body
pub fn render_file(site: &Site, file: &Path) -> Result<String> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))?;
    let (_, body) =
        Metadata::parse(&content).with_context(|| format!("Invalid front-matter in {:?}", file))?;
    let repository = site.repository()?;
    let html = repository
        .renderer()
        .render(body)
        .with_context(|| format!("Failed to render {:?}", file))?;
    Ok(html)
}
