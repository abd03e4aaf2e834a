//! Configuration module

mod settings;
mod site;

pub use settings::{Location, SiteSettings, FALLBACK_AREAS};
pub use site::MarkdownConfig;
pub use site::SiteConfig;
