//! HTML helper functions

use crate::content::RenderNode;

/// Elements written without a closing tag
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize a render tree to an HTML string
pub fn render_html(node: &RenderNode) -> String {
    let mut out = String::new();
    write_html(node, &mut out);
    out
}

fn write_html(node: &RenderNode, out: &mut String) {
    match node {
        RenderNode::Text(text) => out.push_str(&html_escape(text)),
        RenderNode::Raw(html) => out.push_str(html),
        RenderNode::Fragment(children) => {
            for child in children {
                write_html(child, out);
            }
        }
        RenderNode::Tag {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&html_escape(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name.as_str()) {
                return;
            }

            for child in children {
                write_html(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}
