//! Content items and collections

use serde::Serialize;
use serde_yaml::Value;
use std::fmt;
use std::str::FromStr;

use super::frontmatter::is_truthy;
use super::sort::SortPolicy;
use super::Metadata;

/// Default length of a derived excerpt, in characters
pub const EXCERPT_LENGTH: usize = 160;

/// A named directory of documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Pages,
    News,
    Jobs,
    References,
    Team,
    Partners,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Pages,
        Collection::News,
        Collection::Jobs,
        Collection::References,
        Collection::Team,
        Collection::Partners,
    ];

    /// Directory under the content root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::News => "news",
            Collection::Jobs => "jobs",
            Collection::References => "references",
            Collection::Team => "team",
            Collection::Partners => "partners",
        }
    }

    /// Ordering applied to listings; `None` keeps directory order
    pub fn sort_policy(&self) -> Option<SortPolicy> {
        match self {
            Collection::News | Collection::Jobs => Some(SortPolicy::ReverseChronological),
            Collection::References => Some(SortPolicy::ManualOrderThenDate),
            Collection::Team => Some(SortPolicy::OrderUndefinedLast),
            Collection::Pages | Collection::Partners => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "page" | "pages" => Ok(Collection::Pages),
            "news" => Ok(Collection::News),
            "job" | "jobs" => Ok(Collection::Jobs),
            "reference" | "references" => Ok(Collection::References),
            "team" => Ok(Collection::Team),
            "partner" | "partners" => Ok(Collection::Partners),
            other => Err(format!(
                "Unknown collection: {}. Available: pages, news, jobs, references, team, partners",
                other
            )),
        }
    }
}

/// A loaded and rendered document
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    /// File name without extension
    pub slug: String,

    #[serde(flatten)]
    pub metadata: Metadata,

    /// Markdown body as written
    #[serde(skip)]
    pub raw_body: String,

    /// Rendered HTML
    pub body: String,

    /// The metadata excerpt as written, or text derived from the body
    pub excerpt: Value,
}

impl ContentItem {
    /// Title from metadata, or the slug
    pub fn title(&self) -> &str {
        self.metadata.title_or(&self.slug)
    }

    /// The excerpt when it is text
    pub fn excerpt_text(&self) -> Option<&str> {
        self.excerpt.as_str()
    }
}

/// Front-matter keys replaced by computed item fields
pub const COMPUTED_KEYS: [&str; 3] = ["slug", "body", "excerpt"];

/// Drop front-matter fields that would shadow computed item fields
pub fn strip_computed_keys(metadata: &mut Metadata) {
    for key in COMPUTED_KEYS {
        if metadata.extra.shift_remove(key).is_some() {
            tracing::debug!("Ignoring front-matter field {:?}", key);
        }
    }
}

/// The metadata excerpt if set, else one derived from the body
pub fn resolve_excerpt(metadata: &Metadata, raw_body: &str, length: usize) -> Value {
    match &metadata.excerpt {
        Some(excerpt) if is_truthy(excerpt) => excerpt.clone(),
        _ => Value::String(fallback_excerpt(raw_body, length)),
    }
}

/// First `length` characters of the body without `#`, `*` and backticks,
/// followed by `...`
pub fn fallback_excerpt(raw_body: &str, length: usize) -> String {
    let mut excerpt: String = raw_body
        .chars()
        .take(length)
        .filter(|c| !matches!(c, '#' | '*' | '`'))
        .collect();
    excerpt.push_str("...");
    excerpt
}
