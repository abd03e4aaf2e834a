//! Show a single item as JSON

use anyhow::{anyhow, bail, Result};
use serde::Serialize;

use crate::content::{Collection, ContentItem};
use crate::helpers::{alternates, clamp_meta, strip_html, Alternates};
use crate::Site;

/// Longest meta title before clamping
const META_TITLE_LENGTH: usize = 60;
/// Longest meta description before clamping
const META_DESCRIPTION_LENGTH: usize = 160;

/// Page metadata derived from an item
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub alternates: Alternates,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    item: &'a ContentItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<PageMeta>,
}

/// Print an item of a collection as JSON
pub fn run(site: &Site, collection: &str, slug: &str, with_meta: bool) -> Result<()> {
    let collection: Collection = collection.parse().map_err(|e: String| anyhow!(e))?;
    let repository = site.repository()?;

    let Some(item) = repository.item(collection, slug)? else {
        bail!("No {} item with slug {:?}", collection, slug);
    };

    let meta = with_meta.then(|| page_meta(site, collection, &item));
    let output = ShowOutput { item: &item, meta };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Clamped title and description plus alternates for an item
pub fn page_meta(site: &Site, collection: Collection, item: &ContentItem) -> PageMeta {
    let path = match collection {
        Collection::Pages => format!("/{}", item.slug),
        other => format!("/{}/{}", other.dir_name(), item.slug),
    };
    PageMeta {
        title: clamp_meta(item.title(), META_TITLE_LENGTH),
        description: clamp_meta(
            strip_html(item.excerpt_text().unwrap_or_default()).trim(),
            META_DESCRIPTION_LENGTH,
        ),
        alternates: alternates(&path, &site.config.language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_page_meta() {
        let dir = TempDir::new().unwrap();
        let news = dir.path().join("content").join("news");
        fs::create_dir_all(&news).unwrap();
        let title = "A".repeat(80);
        fs::write(
            news.join("launch.md"),
            format!("---\ntitle: {}\nexcerpt: Short <b>intro</b>\n---\nBody\n", title),
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        let item = site
            .repository()
            .unwrap()
            .get_news_item("launch")
            .unwrap()
            .unwrap();
        let meta = page_meta(&site, Collection::News, &item);

        assert_eq!(meta.title.chars().count(), 60);
        assert!(meta.title.ends_with('…'));
        assert_eq!(meta.description, "Short intro");
        assert_eq!(meta.alternates.canonical, "/news/launch");
        assert!(meta.alternates.languages.contains_key("de-CH"));
    }
}
