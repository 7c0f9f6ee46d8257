//! HTML rendering of a single block metric.
//!
//! Templates are plain text with `{{ field }}` tags, where `field` is one of
//! [`BlockMetric::FIELDS`]. Field names match case-insensitively and may carry a leading dot,
//! so `{{ numberOfShielded }}` and `{{.NumberofShielded}}` name the same field.

use std::{io::Write, path::Path};

use crate::{
    error::{OutputError, TemplateError},
    metric::BlockMetric,
};

/// Renders one block metric into a writer.
pub trait BlockRenderer {
    /// Writes the rendering of `metric` to `out`.
    fn render(&self, metric: &BlockMetric, out: &mut dyn Write) -> std::io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(&'static str),
}

/// A parsed block template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTemplate {
    segments: Vec<Segment>,
}

impl HtmlTemplate {
    /// Parses template text, rejecting unknown fields and unterminated tags.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or(TemplateError::UnterminatedTag(offset + open))?;

            let name = after_open[..close].trim();
            let name = name.strip_prefix('.').unwrap_or(name);
            let field = BlockMetric::FIELDS
                .into_iter()
                .find(|field| field.eq_ignore_ascii_case(name))
                .ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;
            segments.push(Segment::Field(field));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Reads and parses the template file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, OutputError> {
        let source = std::fs::read_to_string(path).map_err(OutputError::io(path))?;
        Self::parse(&source).map_err(|source| OutputError::Template {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl BlockRenderer for HtmlTemplate {
    fn render(&self, metric: &BlockMetric, out: &mut dyn Write) -> std::io::Result<()> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.write_all(text.as_bytes())?,
                Segment::Field(name) => {
                    // Parsing only admits names from BlockMetric::FIELDS.
                    let value = metric.field(name).unwrap_or_default();
                    out.write_all(value.as_bytes())?;
                }
            }
        }
        Ok(())
    }
}
