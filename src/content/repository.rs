//! Content repository: per-collection and per-item retrieval

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use super::item::{
    resolve_excerpt, strip_computed_keys, Collection, ContentItem, EXCERPT_LENGTH,
};
use super::loader::{self, RawDocument};
use super::{DateValue, MarkdownRenderer};
use crate::error::{ContentError, Result};
use crate::helpers::DateNormalizer;

/// File-backed content repository.
///
/// Every call reads from disk; nothing is cached between calls.
#[derive(Debug)]
pub struct ContentRepository {
    root: PathBuf,
    renderer: MarkdownRenderer,
    normalizer: DateNormalizer,
    excerpt_length: usize,
}

impl ContentRepository {
    /// Create a repository over `root` with the standard renderer
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            renderer: MarkdownRenderer::new(),
            normalizer: DateNormalizer::default(),
            excerpt_length: EXCERPT_LENGTH,
        }
    }

    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_normalizer(mut self, normalizer: DateNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_excerpt_length(mut self, length: usize) -> Self {
        self.excerpt_length = length;
        self
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// A single page; `blocks` defaults to an empty list
    pub fn get_page(&self, slug: &str) -> Result<Option<ContentItem>> {
        self.item(Collection::Pages, slug)
    }

    /// Every page, in directory order
    pub fn get_all_pages(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::Pages)
    }

    /// News, newest first, with dates in canonical form
    pub fn get_all_news(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::News)
    }

    pub fn get_news_item(&self, slug: &str) -> Result<Option<ContentItem>> {
        self.item(Collection::News, slug)
    }

    /// References: manual order first, then newest first
    pub fn get_all_references(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::References)
    }

    pub fn get_reference_item(&self, slug: &str) -> Result<Option<ContentItem>> {
        self.item(Collection::References, slug)
    }

    /// Jobs, newest first; dates keep their source form
    pub fn get_all_jobs(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::Jobs)
    }

    pub fn get_job_item(&self, slug: &str) -> Result<Option<ContentItem>> {
        self.item(Collection::Jobs, slug)
    }

    /// Team members by `order`, unordered members last
    pub fn get_all_team(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::Team)
    }

    /// Partners, in directory order
    pub fn get_all_partners(&self) -> Result<Vec<ContentItem>> {
        self.collection(Collection::Partners)
    }

    /// Load and order a whole collection.
    ///
    /// Documents that fail to load or render are skipped with a warning.
    pub fn collection(&self, collection: Collection) -> Result<Vec<ContentItem>> {
        let dir = self.root.join(collection.dir_name());
        let mut items = Vec::new();

        for path in loader::list_documents(&dir) {
            match self.load_item(collection, &path) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping {} document: {}", collection, e),
            }
        }

        let items = match collection.sort_policy() {
            Some(policy) => policy.sort(items, &self.normalizer),
            None => items,
        };

        let items = if collection == Collection::News {
            items.into_iter().map(|item| self.normalize_date(item)).collect()
        } else {
            items
        };

        tracing::debug!("Loaded {} {} documents", items.len(), collection);
        Ok(items)
    }

    /// Load one document of a collection; `Ok(None)` when it does not exist
    pub fn item(&self, collection: Collection, slug: &str) -> Result<Option<ContentItem>> {
        let dir = self.root.join(collection.dir_name());
        let Some(path) = loader::document_path(&dir, slug) else {
            return Ok(None);
        };

        let item = self.load_item(collection, &path)?;
        Ok(match collection {
            Collection::News => item.map(|item| self.normalize_date(item)),
            _ => item,
        })
    }

    fn load_item(&self, collection: Collection, path: &Path) -> Result<Option<ContentItem>> {
        let Some(document) = loader::load_document(path)? else {
            return Ok(None);
        };
        let mut item = self.build_item(document)?;
        if collection == Collection::Pages && item.metadata.blocks.is_none() {
            item.metadata.blocks = Some(Value::Sequence(Vec::new()));
        }
        Ok(Some(item))
    }

    fn build_item(&self, document: RawDocument) -> Result<ContentItem> {
        let RawDocument {
            slug,
            path,
            mut metadata,
            raw_body,
        } = document;
        strip_computed_keys(&mut metadata);

        let body = self
            .renderer
            .render(&raw_body)
            .map_err(|e| ContentError::from(e).in_document(&path))?;
        let excerpt = resolve_excerpt(&metadata, &raw_body, self.excerpt_length);

        Ok(ContentItem {
            slug,
            metadata,
            raw_body,
            body,
            excerpt,
        })
    }

    /// Replace the date with its canonical form; a missing date becomes now
    fn normalize_date(&self, mut item: ContentItem) -> ContentItem {
        let instant = self.normalizer.normalize(item.metadata.date.as_ref());
        item.metadata.date = Some(DateValue::Instant(instant));
        item
    }
}
