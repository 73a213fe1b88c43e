use serde::{Deserialize, Serialize};

use super::identifier::Identifier;
use super::value::Value;
use crate::span::Span;

/// Metadata attached to the enclosing node: tags, properties or
/// documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Describer {
    pub kind: DescriberKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DescriberKind {
    /// `[a, b, c]`
    Tags(Vec<Identifier>),
    /// `key :: value`
    Property { key: Identifier, value: Value },
    /// `> text`
    Doc(String),
    /// `>>` followed by an indented block of raw lines.
    DocBlock(Vec<DocLine>),
}

/// One raw line of a `>>` block. Indentation beyond the block's first line
/// is kept as leading spaces in `text`; the span covers the source text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLine {
    pub text: String,
    pub span: Span,
}

impl DocLine {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl Describer {
    pub fn new(kind: DescriberKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Documentation text, with block lines joined by `\n`.
    pub fn documentation(&self) -> Option<String> {
        match &self.kind {
            DescriberKind::Doc(text) => Some(text.clone()),
            DescriberKind::DocBlock(lines) => Some(
                lines
                    .iter()
                    .map(|line| line.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }

    pub fn tags(&self) -> &[Identifier] {
        match &self.kind {
            DescriberKind::Tags(tags) => tags,
            _ => &[],
        }
    }
}
