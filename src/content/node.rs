//! Document tree: markdown parsed by pulldown-cmark, plus block-level
//! `{% tag %}` lines such as the `{% table %}` shorthand.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::error::MarkupError;

lazy_static! {
    static ref TAG_LINE: Regex =
        Regex::new(r"^\{%\s*(/)?([A-Za-z][\w-]*)((?:\s+[^%]*?)?)\s*(/)?%\}$").unwrap();
    static ref TAG_ATTRIBUTE: Regex =
        Regex::new(r#"([A-Za-z][\w-]*)\s*=\s*(?:"([^"]*)"|(\S+))"#).unwrap();
}

/// Kinds of node a transform can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    Fence,
    List,
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    Code,
    Link,
    Image,
    HardBreak,
    SoftBreak,
    Rule,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    /// A `{% name %}` block without built-in structure
    Tag,
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A structural node with attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: NodeKind,
    /// Tag name for `{% name %}` elements
    pub name: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Append a child, merging adjacent text
    fn push(&mut self, node: Node) {
        if let Node::Text(text) = &node {
            if let Some(Node::Text(last)) = self.children.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.children.push(node);
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.kind == NodeKind::SoftBreak => out.push(' '),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// A parsed document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// Markdown extensions enabled for content documents
fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Parse a document body into a tree
pub fn parse(source: &str) -> Result<Document, MarkupError> {
    let mut frames = vec![Frame::root()];
    let mut fence: Option<(char, usize)> = None;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();

        if let Some((marker, len)) = fence {
            if closes_fence(trimmed, marker, len) {
                fence = None;
            }
            top(&mut frames)?.source.push_str(line);
            continue;
        }

        if let Some(open) = opens_fence(line) {
            fence = Some(open);
            top(&mut frames)?.source.push_str(line);
            continue;
        }

        if is_tag_line(trimmed) {
            handle_tag_line(&mut frames, trimmed, line_no)?;
            continue;
        }

        top(&mut frames)?.source.push_str(line);
    }

    if frames.len() > 1 {
        let open = &frames[frames.len() - 1];
        return Err(MarkupError::UnclosedTag {
            name: open.name.clone().unwrap_or_default(),
            line: open.line,
        });
    }

    let mut root = frames
        .pop()
        .ok_or_else(|| MarkupError::Unbalanced("missing document root".to_string()))?;
    root.flush()?;

    Ok(Document {
        root: Element::new(NodeKind::Document).with_children(root.children),
    })
}

/// Parse plain markdown into nodes
fn parse_markdown(text: &str) -> Result<Vec<Node>, MarkupError> {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(text, markdown_options()) {
        builder.event(event)?;
    }
    builder.finish()
}

/// An open `{% name %}` block
struct Frame {
    name: Option<String>,
    attributes: IndexMap<String, String>,
    line: usize,
    /// Markdown not yet parsed
    source: String,
    children: Vec<Node>,
}

impl Frame {
    fn root() -> Self {
        Self {
            name: None,
            attributes: IndexMap::new(),
            line: 0,
            source: String::new(),
            children: Vec::new(),
        }
    }

    fn is_table(&self) -> bool {
        self.name.as_deref() == Some("table")
    }

    /// Parse pending markdown into children. Tables keep their raw source
    /// until closed.
    fn flush(&mut self) -> Result<(), MarkupError> {
        if self.is_table() || self.source.is_empty() {
            return Ok(());
        }
        let source = std::mem::take(&mut self.source);
        self.children.extend(parse_markdown(&source)?);
        Ok(())
    }

    fn into_element(self) -> Result<Element, MarkupError> {
        if self.is_table() {
            return build_table(&self.source, self.line);
        }
        let mut element = Element::new(NodeKind::Tag).with_children(self.children);
        element.name = self.name;
        element.attributes = self.attributes;
        Ok(element)
    }
}

fn top(frames: &mut [Frame]) -> Result<&mut Frame, MarkupError> {
    frames
        .last_mut()
        .ok_or_else(|| MarkupError::Unbalanced("missing document root".to_string()))
}

/// A line holding exactly one `{% ... %}` tag and nothing else. Lines with
/// inline tags around other content stay markdown text.
fn is_tag_line(line: &str) -> bool {
    line.starts_with("{%")
        && line.ends_with("%}")
        && line.matches("{%").count() == 1
        && line.matches("%}").count() == 1
}

fn handle_tag_line(frames: &mut Vec<Frame>, line: &str, line_no: usize) -> Result<(), MarkupError> {
    let caps = TAG_LINE.captures(line).ok_or_else(|| MarkupError::MalformedTag {
        line: line_no,
        text: line.to_string(),
    })?;

    let closing = caps.get(1).is_some();
    let name = caps[2].to_string();
    let self_closing = caps.get(4).is_some();
    let attributes = parse_attributes(caps.get(3).map_or("", |m| m.as_str()));

    if closing && self_closing {
        return Err(MarkupError::MalformedTag {
            line: line_no,
            text: line.to_string(),
        });
    }

    let current = top(frames)?;
    if current.is_table() && !(closing && name == "table") {
        return Err(MarkupError::InvalidTable {
            line: current.line,
            message: format!("tags cannot be nested inside a table (line {})", line_no),
        });
    }
    current.flush()?;

    if closing {
        if frames.len() < 2 || frames[frames.len() - 1].name.as_deref() != Some(name.as_str()) {
            return Err(MarkupError::UnexpectedClose {
                name,
                line: line_no,
            });
        }
        let frame = frames
            .pop()
            .ok_or_else(|| MarkupError::Unbalanced("tag stack underflow".to_string()))?;
        let element = frame.into_element()?;
        top(frames)?.children.push(Node::Element(element));
        return Ok(());
    }

    let frame = Frame {
        name: Some(name),
        attributes,
        line: line_no,
        source: String::new(),
        children: Vec::new(),
    };

    if self_closing {
        let element = frame.into_element()?;
        top(frames)?.children.push(Node::Element(element));
    } else {
        frames.push(frame);
    }

    Ok(())
}

fn parse_attributes(raw: &str) -> IndexMap<String, String> {
    TAG_ATTRIBUTE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

/// Build a table from the `{% table %}` shorthand: lists separated by `---`
/// lines, the first list being the header row.
fn build_table(source: &str, line: usize) -> Result<Element, MarkupError> {
    let mut rows: Vec<Vec<Vec<Node>>> = Vec::new();

    for chunk in split_rows(source) {
        if chunk.trim().is_empty() {
            continue;
        }
        let nodes = parse_markdown(&chunk)?;
        let list = match nodes.as_slice() {
            [Node::Element(el)] if el.kind == NodeKind::List => el,
            _ => {
                return Err(MarkupError::InvalidTable {
                    line,
                    message: "each row must be a single list".to_string(),
                })
            }
        };
        let cells = list
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Element(item) if item.kind == NodeKind::Item => Some(cell_children(item)),
                _ => None,
            })
            .collect();
        rows.push(cells);
    }

    let mut rows = rows.into_iter();
    let mut table = Element::new(NodeKind::Table);

    if let Some(header) = rows.next() {
        let row = table_row(header, NodeKind::TableHeaderCell);
        table.children.push(Node::Element(
            Element::new(NodeKind::TableHead).with_children(vec![row]),
        ));
    }

    let body: Vec<Node> = rows.map(|cells| table_row(cells, NodeKind::TableCell)).collect();
    if !body.is_empty() {
        table
            .children
            .push(Node::Element(Element::new(NodeKind::TableBody).with_children(body)));
    }

    Ok(table)
}

fn split_rows(source: &str) -> Vec<String> {
    let mut rows = vec![String::new()];
    for line in source.split_inclusive('\n') {
        if line.trim() == "---" {
            rows.push(String::new());
        } else if let Some(last) = rows.last_mut() {
            last.push_str(line);
        }
    }
    rows
}

/// Loose list items wrap their content in a paragraph; cells do not
fn cell_children(item: &Element) -> Vec<Node> {
    match item.children.as_slice() {
        [Node::Element(p)] if p.kind == NodeKind::Paragraph => p.children.clone(),
        children => children.to_vec(),
    }
}

fn table_row(cells: Vec<Vec<Node>>, cell_kind: NodeKind) -> Node {
    let cells = cells
        .into_iter()
        .map(|children| Node::Element(Element::new(cell_kind).with_children(children)))
        .collect();
    Node::Element(Element::new(NodeKind::TableRow).with_children(cells))
}

fn opens_fence(line: &str) -> Option<(char, usize)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    (len >= 3).then_some((marker, len))
}

fn closes_fence(trimmed: &str, marker: char, len: usize) -> bool {
    let run = trimmed.chars().take_while(|c| *c == marker).count();
    run >= len && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

/// Folds pulldown-cmark events into elements
struct TreeBuilder {
    stack: Vec<Element>,
    alignments: Vec<Alignment>,
    in_head: bool,
    column: usize,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(NodeKind::Document)],
            alignments: Vec::new(),
            in_head: false,
            column: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), MarkupError> {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag)?,
            Event::Text(text) => self.append(Node::Text(text.to_string()))?,
            Event::Code(code) => self.append(Node::Element(
                Element::new(NodeKind::Code).with_children(vec![Node::Text(code.to_string())]),
            ))?,
            // Raw HTML is not passed through
            Event::Html(html) | Event::InlineHtml(html) => {
                self.append(Node::Text(html.to_string()))?
            }
            Event::SoftBreak => self.append(Node::Element(Element::new(NodeKind::SoftBreak)))?,
            Event::HardBreak => self.append(Node::Element(Element::new(NodeKind::HardBreak)))?,
            Event::Rule => self.append(Node::Element(Element::new(NodeKind::Rule)))?,
            other => tracing::debug!("Ignoring markdown event {:?}", other),
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) {
        let element = match tag {
            Tag::Paragraph | Tag::HtmlBlock => Element::new(NodeKind::Paragraph),
            Tag::Heading { level, .. } => {
                Element::new(NodeKind::Heading).with_attribute("level", (level as usize).to_string())
            }
            Tag::BlockQuote(_) => Element::new(NodeKind::BlockQuote),
            Tag::CodeBlock(kind) => {
                let fence = Element::new(NodeKind::Fence);
                match kind {
                    CodeBlockKind::Fenced(info) => {
                        match info.split_whitespace().next() {
                            Some(lang) => fence.with_attribute("language", lang),
                            None => fence,
                        }
                    }
                    CodeBlockKind::Indented => fence,
                }
            }
            Tag::List(Some(start)) => Element::new(NodeKind::List)
                .with_attribute("ordered", "true")
                .with_attribute("start", start.to_string()),
            Tag::List(None) => Element::new(NodeKind::List),
            Tag::Item => Element::new(NodeKind::Item),
            Tag::Emphasis => Element::new(NodeKind::Emphasis),
            Tag::Strong => Element::new(NodeKind::Strong),
            Tag::Strikethrough => Element::new(NodeKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => with_title(
                Element::new(NodeKind::Link).with_attribute("href", dest_url.to_string()),
                &title,
            ),
            Tag::Image {
                dest_url, title, ..
            } => with_title(
                Element::new(NodeKind::Image).with_attribute("src", dest_url.to_string()),
                &title,
            ),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                Element::new(NodeKind::Table)
            }
            Tag::TableHead => {
                // pulldown-cmark puts header cells directly under the head
                self.in_head = true;
                self.column = 0;
                self.stack.push(Element::new(NodeKind::TableHead));
                Element::new(NodeKind::TableRow)
            }
            Tag::TableRow => {
                if self.top_kind() == Some(NodeKind::Table) {
                    self.stack.push(Element::new(NodeKind::TableBody));
                }
                self.column = 0;
                Element::new(NodeKind::TableRow)
            }
            Tag::TableCell => {
                let kind = if self.in_head {
                    NodeKind::TableHeaderCell
                } else {
                    NodeKind::TableCell
                };
                let cell = match self.alignments.get(self.column) {
                    Some(Alignment::Left) => Element::new(kind).with_attribute("align", "left"),
                    Some(Alignment::Center) => Element::new(kind).with_attribute("align", "center"),
                    Some(Alignment::Right) => Element::new(kind).with_attribute("align", "right"),
                    _ => Element::new(kind),
                };
                self.column += 1;
                cell
            }
            _ => Element::new(NodeKind::Tag),
        };
        self.stack.push(element);
    }

    fn end(&mut self, tag: TagEnd) -> Result<(), MarkupError> {
        match tag {
            TagEnd::TableHead => {
                self.pop()?;
                self.pop()?;
                self.in_head = false;
            }
            TagEnd::Table => {
                if self.top_kind() == Some(NodeKind::TableBody) {
                    self.pop()?;
                }
                self.pop()?;
                self.alignments.clear();
            }
            _ => self.pop()?,
        }
        Ok(())
    }

    fn top_kind(&self) -> Option<NodeKind> {
        self.stack.last().map(|el| el.kind)
    }

    fn append(&mut self, node: Node) -> Result<(), MarkupError> {
        self.stack
            .last_mut()
            .ok_or_else(|| MarkupError::Unbalanced("no open element".to_string()))?
            .push(node);
        Ok(())
    }

    fn pop(&mut self) -> Result<(), MarkupError> {
        if self.stack.len() < 2 {
            return Err(MarkupError::Unbalanced("end without start".to_string()));
        }
        let element = self
            .stack
            .pop()
            .ok_or_else(|| MarkupError::Unbalanced("end without start".to_string()))?;
        self.append(Node::Element(element))
    }

    fn finish(mut self) -> Result<Vec<Node>, MarkupError> {
        if self.stack.len() != 1 {
            return Err(MarkupError::Unbalanced(format!(
                "{} unclosed elements",
                self.stack.len() - 1
            )));
        }
        let root = self
            .stack
            .pop()
            .ok_or_else(|| MarkupError::Unbalanced("missing root".to_string()))?;
        Ok(root.children)
    }
}

fn with_title(element: Element, title: &str) -> Element {
    if title.is_empty() {
        element
    } else {
        element.with_attribute("title", title)
    }
}
