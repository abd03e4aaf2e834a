//! Error types for content loading and markup rendering

use std::path::PathBuf;
use thiserror::Error;

/// Markup parsing and rendering errors
#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("Malformed tag at line {line}: {text}")]
    MalformedTag { line: usize, text: String },

    #[error("Unclosed tag {{% {name} %}} opened at line {line}")]
    UnclosedTag { name: String, line: usize },

    #[error("Unexpected closing tag {{% /{name} %}} at line {line}")]
    UnexpectedClose { name: String, line: usize },

    #[error("Invalid table at line {line}: {message}")]
    InvalidTable { line: usize, message: String },

    #[error("Unbalanced markdown structure: {0}")]
    Unbalanced(String),

    #[error("Highlight error: {0}")]
    Highlight(String),
}

/// Errors raised while loading a single document
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unterminated front-matter block")]
    UnterminatedFrontMatter,

    #[error("Front-matter must be a mapping, found {0}")]
    FrontMatterShape(String),

    #[error("Failed to parse YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render markup: {0}")]
    Markup(#[from] MarkupError),

    #[error("{path:?}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: Box<ContentError>,
    },
}

impl ContentError {
    /// Attach the document path to an error raised while processing it
    pub fn in_document(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ContentError::Io { .. } | ContentError::Document { .. } => self,
            other => ContentError::Document {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
