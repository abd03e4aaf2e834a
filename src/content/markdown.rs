//! Markdown rendering: parse to a document tree, transform through the
//! node registry, serialize to HTML

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::node::{self, Document, Element, NodeKind};
use super::transform::{RenderNode, TransformRegistry};
use crate::config::MarkdownConfig;
use crate::error::MarkupError;
use crate::helpers::{html_escape, render_html};

/// Markdown renderer with a configurable node-transform registry
#[derive(Debug)]
pub struct MarkdownRenderer {
    registry: TransformRegistry,
}

impl MarkdownRenderer {
    /// Create a renderer with the standard link and table transforms
    pub fn new() -> Self {
        Self::with_registry(TransformRegistry::standard())
    }

    /// Create with a custom registry
    pub fn with_registry(registry: TransformRegistry) -> Self {
        Self { registry }
    }

    /// Create from configuration, enabling code highlighting if requested
    pub fn with_options(options: &MarkdownConfig) -> Self {
        let mut registry = TransformRegistry::standard();
        if options.highlight {
            let highlighter = Highlighter::new(&options.theme, options.line_numbers);
            registry.register(NodeKind::Fence, move |element, _| {
                highlighter.transform(element)
            });
        }
        Self { registry }
    }

    /// Parse markdown into a document tree
    pub fn parse(&self, markdown: &str) -> Result<Document, MarkupError> {
        node::parse(markdown)
    }

    /// Render a parsed document to HTML
    pub fn render_document(&self, document: &Document) -> Result<String, MarkupError> {
        let tree = self.registry.transform_element(&document.root)?;
        Ok(render_html(&tree))
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String, MarkupError> {
        let document = self.parse(markdown)?;
        self.render_document(&document)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Syntax highlighting for code fences
struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl Highlighter {
    fn new(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    fn transform(&self, element: &Element) -> Result<RenderNode, MarkupError> {
        let code = element.text_content();
        let html = self.highlight_code(&code, element.attribute("language"))?;
        Ok(RenderNode::Raw(html))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Result<String, MarkupError> {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
            .ok_or_else(|| MarkupError::Highlight("no themes available".to_string()))?;

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    Ok(self.add_line_numbers(&highlighted, &class))
                } else {
                    Ok(format!(
                        r#"<figure class="highlight {}">{}</figure>"#,
                        class, highlighted
                    ))
                }
            }
            Err(e) => {
                tracing::warn!("Failed to highlight {} block: {}", lang, e);
                Ok(format!(
                    r#"<pre data-language="{}">{}</pre>"#,
                    class,
                    html_escape(code)
                ))
            }
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, class: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            class,
            gutter,
            lines.join("\n")
        )
    }
}
