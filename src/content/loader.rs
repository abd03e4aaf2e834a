//! Document loader - reads front-matter documents from the content directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::Metadata;
use crate::error::{ContentError, Result};

/// A document split into metadata and unrendered body
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub slug: String,
    pub path: PathBuf,
    pub metadata: Metadata,
    pub raw_body: String,
}

/// Load a single document. A missing file is `Ok(None)`.
pub fn load_document(path: &Path) -> Result<Option<RawDocument>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let (metadata, body) = Metadata::parse(&content).map_err(|e| e.in_document(path))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    tracing::debug!("Loaded {:?}", path);

    Ok(Some(RawDocument {
        slug,
        path: path.to_path_buf(),
        metadata,
        raw_body: body.to_string(),
    }))
}

/// Document files directly inside `dir`, sorted by file name.
/// A missing directory has no documents.
pub fn list_documents(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::debug!("Content directory {:?} does not exist", dir);
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_markdown_file(path))
        .collect()
}

/// Path of the document for `slug`, or `None` if the slug could escape the
/// collection directory
pub fn document_path(dir: &Path, slug: &str) -> Option<PathBuf> {
    if !is_valid_slug(slug) {
        tracing::debug!("Rejecting slug {:?}", slug);
        return None;
    }
    Some(dir.join(format!("{}.md", slug)))
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}
