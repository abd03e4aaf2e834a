//! Content module - document loading, markdown rendering, collections

mod frontmatter;
mod item;
pub mod loader;
mod markdown;
pub mod node;
mod repository;
mod sort;
mod transform;

pub use frontmatter::{DateValue, Metadata};
pub use item::{
    fallback_excerpt, resolve_excerpt, strip_computed_keys, Collection, ContentItem,
    COMPUTED_KEYS, EXCERPT_LENGTH,
};
pub use markdown::MarkdownRenderer;
pub use repository::ContentRepository;
pub use sort::SortPolicy;
pub use transform::{
    default_transform, is_external, rewrite_href, transform_link, NodeTransform, RenderNode,
    TransformRegistry, TABLE_KINDS,
};
