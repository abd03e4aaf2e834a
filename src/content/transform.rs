//! Node-transform registry
//!
//! Rendering happens in two steps: document nodes are transformed into
//! [`RenderNode`]s, which are then serialized to HTML. A transform registered
//! for a [`NodeKind`] replaces the default transform for every node of that
//! kind.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

use super::node::{Element, Node, NodeKind};
use crate::error::MarkupError;

/// A renderable tag tree
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Tag {
        name: String,
        attributes: IndexMap<String, String>,
        children: Vec<RenderNode>,
    },
    /// Text, escaped on output
    Text(String),
    /// Markup inserted verbatim
    Raw(String),
    /// Children without a wrapping tag
    Fragment(Vec<RenderNode>),
}

impl RenderNode {
    pub fn tag(
        name: impl Into<String>,
        attributes: IndexMap<String, String>,
        children: Vec<RenderNode>,
    ) -> Self {
        RenderNode::Tag {
            name: name.into(),
            attributes,
            children,
        }
    }
}

/// Transform function for one node kind
pub type NodeTransform =
    Box<dyn Fn(&Element, &TransformRegistry) -> Result<RenderNode, MarkupError> + Send + Sync>;

/// Table kinds share the default structural rendering
pub const TABLE_KINDS: [NodeKind; 6] = [
    NodeKind::Table,
    NodeKind::TableHead,
    NodeKind::TableBody,
    NodeKind::TableRow,
    NodeKind::TableCell,
    NodeKind::TableHeaderCell,
];

/// Mapping from node kind to transform
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<NodeKind, NodeTransform>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.transforms.keys().map(|k| format!("{:?}", k)).collect();
        kinds.sort();
        f.debug_struct("TransformRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl TransformRegistry {
    /// A registry with no overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Link rewriting plus explicit table pass-through
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(NodeKind::Link, transform_link);
        for kind in TABLE_KINDS {
            registry.register(kind, default_transform);
        }
        registry
    }

    /// Register a transform, replacing any previous one for `kind`
    pub fn register<F>(&mut self, kind: NodeKind, transform: F) -> &mut Self
    where
        F: Fn(&Element, &TransformRegistry) -> Result<RenderNode, MarkupError>
            + Send
            + Sync
            + 'static,
    {
        self.transforms.insert(kind, Box::new(transform));
        self
    }

    pub fn is_registered(&self, kind: NodeKind) -> bool {
        self.transforms.contains_key(&kind)
    }

    pub fn transform(&self, node: &Node) -> Result<RenderNode, MarkupError> {
        match node {
            Node::Text(text) => Ok(RenderNode::Text(text.clone())),
            Node::Element(element) => self.transform_element(element),
        }
    }

    pub fn transform_element(&self, element: &Element) -> Result<RenderNode, MarkupError> {
        match self.transforms.get(&element.kind) {
            Some(transform) => transform(element, self),
            None => default_transform(element, self),
        }
    }

    pub fn transform_children(&self, element: &Element) -> Result<Vec<RenderNode>, MarkupError> {
        element.children.iter().map(|child| self.transform(child)).collect()
    }
}

/// Built-in rendering for every node kind
pub fn default_transform(
    element: &Element,
    registry: &TransformRegistry,
) -> Result<RenderNode, MarkupError> {
    let simple = |name: &str| -> Result<RenderNode, MarkupError> {
        Ok(RenderNode::tag(
            name,
            IndexMap::new(),
            registry.transform_children(element)?,
        ))
    };

    match element.kind {
        NodeKind::Document => simple("article"),
        NodeKind::Paragraph => simple("p"),
        NodeKind::Heading => {
            let level = element
                .attribute("level")
                .and_then(|l| l.parse::<u8>().ok())
                .unwrap_or(1)
                .clamp(1, 6);
            simple(&format!("h{}", level))
        }
        NodeKind::BlockQuote => simple("blockquote"),
        NodeKind::Fence => {
            let attributes = copy_attributes(element, &[("language", "data-language")]);
            Ok(RenderNode::tag(
                "pre",
                attributes,
                registry.transform_children(element)?,
            ))
        }
        NodeKind::List => {
            if element.attribute("ordered").is_some() {
                let mut attributes = IndexMap::new();
                if let Some(start) = element.attribute("start").filter(|s| *s != "1") {
                    attributes.insert("start".to_string(), start.to_string());
                }
                Ok(RenderNode::tag(
                    "ol",
                    attributes,
                    registry.transform_children(element)?,
                ))
            } else {
                simple("ul")
            }
        }
        NodeKind::Item => simple("li"),
        NodeKind::Emphasis => simple("em"),
        NodeKind::Strong => simple("strong"),
        NodeKind::Strikethrough => simple("s"),
        NodeKind::Code => simple("code"),
        NodeKind::Link => Ok(RenderNode::tag(
            "a",
            copy_attributes(element, &[("href", "href"), ("title", "title")]),
            registry.transform_children(element)?,
        )),
        NodeKind::Image => {
            let mut attributes = copy_attributes(element, &[("src", "src")]);
            attributes.insert("alt".to_string(), element.text_content());
            if let Some(title) = element.attribute("title") {
                attributes.insert("title".to_string(), title.to_string());
            }
            Ok(RenderNode::tag("img", attributes, Vec::new()))
        }
        NodeKind::HardBreak => simple("br"),
        NodeKind::SoftBreak => Ok(RenderNode::Text(" ".to_string())),
        NodeKind::Rule => simple("hr"),
        NodeKind::Table => simple("table"),
        NodeKind::TableHead => simple("thead"),
        NodeKind::TableBody => simple("tbody"),
        NodeKind::TableRow => simple("tr"),
        NodeKind::TableHeaderCell | NodeKind::TableCell => {
            let name = if element.kind == NodeKind::TableHeaderCell {
                "th"
            } else {
                "td"
            };
            Ok(RenderNode::tag(
                name,
                copy_attributes(element, &[("align", "align")]),
                registry.transform_children(element)?,
            ))
        }
        NodeKind::Tag => Ok(RenderNode::Fragment(registry.transform_children(element)?)),
    }
}

fn copy_attributes(element: &Element, mapping: &[(&str, &str)]) -> IndexMap<String, String> {
    mapping
        .iter()
        .filter_map(|(from, to)| {
            element
                .attribute(from)
                .map(|value| (to.to_string(), value.to_string()))
        })
        .collect()
}

/// Links: `www.` hrefs gain `https://`, and http(s) links open in a new
/// browsing context without a back-reference to this page.
pub fn transform_link(
    element: &Element,
    registry: &TransformRegistry,
) -> Result<RenderNode, MarkupError> {
    let children = registry.transform_children(element)?;
    let href = element.attribute("href").map(rewrite_href);

    let mut attributes = IndexMap::new();
    if let Some(href) = &href {
        attributes.insert("href".to_string(), href.clone());
    }
    if let Some(title) = element.attribute("title") {
        attributes.insert("title".to_string(), title.to_string());
    }
    if href.as_deref().is_some_and(is_external) {
        attributes.insert("target".to_string(), "_blank".to_string());
        attributes.insert("rel".to_string(), "noopener noreferrer".to_string());
    }

    Ok(RenderNode::tag("a", attributes, children))
}

/// Prepend `https://` to bare `www.` hosts
pub fn rewrite_href(href: &str) -> String {
    if href.starts_with("www.") {
        format!("https://{}", href)
    } else {
        href.to_string()
    }
}

/// Whether an href uses an http(s) scheme
pub fn is_external(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
