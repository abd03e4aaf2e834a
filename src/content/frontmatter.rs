//! Front-matter parsing

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;

use crate::error::{ContentError, Result};
use crate::helpers::to_iso_string;

/// A date as it appears in front-matter
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    /// An already-normalized instant
    Instant(DateTime<Utc>),
    /// Raw text as written by the author (`2024-01-15`, `25.12.2024`, ...)
    Text(String),
}

impl DateValue {
    /// Convert a YAML scalar, treating falsy values as absent
    fn from_yaml(value: Value) -> Option<Self> {
        if !is_truthy(&value) {
            return None;
        }
        match value {
            Value::String(s) => Some(DateValue::Text(s)),
            Value::Number(n) => Some(DateValue::Text(n.to_string())),
            Value::Bool(b) => Some(DateValue::Text(b.to_string())),
            other => {
                let text = serde_yaml::to_string(&other).unwrap_or_default();
                Some(DateValue::Text(text.trim().to_string()))
            }
        }
    }
}

/// Whether a front-matter value counts as set: `null`, `false`, `0` and the
/// empty string do not
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DateValue::Instant(instant) => serializer.serialize_str(&to_iso_string(instant)),
            DateValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Whole orders are written back as integers
fn serialize_order<S: Serializer>(
    order: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match order {
        Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
            serializer.serialize_i64(*n as i64)
        }
        Some(n) => serializer.serialize_f64(*n),
        None => serializer.serialize_none(),
    }
}

/// Text of a scalar where a string is expected
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Front-matter of a content document.
///
/// The fields every consumer relies on are typed; everything else is kept in
/// `extra` in source order. A typed field whose value does not fit its type
/// (a per-language title mapping, a text `order`) stays in `extra` unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,

    /// Only numeric orders take part in manual ordering
    #[serde(
        serialize_with = "serialize_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<f64>,

    /// Emitted through [`ContentItem::excerpt`](super::ContentItem) instead
    #[serde(skip_serializing)]
    pub excerpt: Option<Value>,

    /// Page blocks, carried through whatever their shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Value>,

    /// Collection-specific fields
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = IndexMap::<Value, Value>::deserialize(deserializer)?;
        Ok(Metadata::from_fields(fields))
    }
}

impl Metadata {
    /// Split a document into metadata and body.
    ///
    /// A document without a leading `---` line has empty metadata and is
    /// returned whole. `---json` selects JSON instead of YAML.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let (first_line, rest) = split_line(content);
        let lang = match first_line.trim_end().strip_prefix("---") {
            Some(lang) if !lang.starts_with('-') => lang.trim(),
            _ => return Ok((Metadata::default(), content)),
        };

        let (block, body) = find_closing(rest).ok_or(ContentError::UnterminatedFrontMatter)?;

        if block.trim().is_empty() {
            return Ok((Metadata::default(), body));
        }

        let metadata = match lang {
            "json" => Self::parse_json(block)?,
            "" | "yaml" | "yml" => Self::parse_yaml(block)?,
            other => {
                tracing::warn!("Unknown front-matter language {:?}, reading as YAML", other);
                Self::parse_yaml(block)?
            }
        };

        Ok((metadata, body))
    }

    fn parse_yaml(block: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(block)?;
        match value {
            serde_yaml::Value::Null => Ok(Metadata::default()),
            serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
            other => Err(ContentError::FrontMatterShape(yaml_kind(&other).to_string())),
        }
    }

    fn parse_json(block: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(block)?;
        if !value.is_object() {
            return Err(ContentError::FrontMatterShape("a JSON non-object".to_string()));
        }
        // Round-trip through YAML so both syntaxes share the same field rules
        let yaml = serde_yaml::to_value(value)?;
        Ok(serde_yaml::from_value(yaml)?)
    }

    fn from_fields(fields: IndexMap<Value, Value>) -> Self {
        let mut metadata = Metadata::default();

        for (key, value) in fields {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    tracing::debug!("Ignoring front-matter key {:?}", other);
                    continue;
                }
            };

            match key.as_str() {
                "title" if value.is_null() => {}
                "title" => match scalar_text(&value) {
                    Some(title) => metadata.title = Some(title),
                    None => {
                        metadata.extra.insert(key, value);
                    }
                },
                "date" => metadata.date = DateValue::from_yaml(value),
                "order" if value.is_null() => {}
                "order" => match value.as_f64() {
                    Some(order) => metadata.order = Some(order),
                    None => {
                        tracing::debug!("Non-numeric order {:?} kept as a plain field", value);
                        metadata.extra.insert(key, value);
                    }
                },
                "excerpt" => metadata.excerpt = Some(value).filter(|v| !v.is_null()),
                "blocks" => metadata.blocks = Some(value).filter(|v| !v.is_null()),
                _ => {
                    metadata.extra.insert(key, value);
                }
            }
        }

        metadata
    }

    /// Title, or `fallback` when absent
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    /// Whether the document carries a usable date
    pub fn has_date(&self) -> bool {
        self.date.is_some()
    }
}

/// Split off the first line, without its line break
fn split_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (s[..pos].trim_end_matches('\r'), &s[pos + 1..]),
        None => (s, ""),
    }
}

/// Find the closing `---` line. Returns (block, body) with exactly one line
/// break after the delimiter removed from the body.
fn find_closing(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    loop {
        let remaining = &rest[offset..];
        if remaining.is_empty() {
            return None;
        }
        let (line, after) = split_line(remaining);
        if line.trim_end() == "---" {
            let block = &rest[..offset];
            return Some((block, after));
        }
        if after.is_empty() {
            return None;
        }
        offset = rest.len() - after.len();
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
