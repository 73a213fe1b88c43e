use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::Identifier;
use super::types::TypeDeclaration;
use crate::span::Span;

/// A literal value: defaults, examples, modifiers, type arguments and
/// property values all share this representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub kind: ValueKind,
    pub span: Span,
}

/// The shape of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValueKind {
    /// `{key: value, "quoted key": value}`
    Object(Vec<ObjectEntry>),
    /// `[value, value]`
    Array(Vec<Value>),
    /// A double-quoted string with escapes already decoded.
    String(String),
    /// A number lexeme kept verbatim, e.g. `-1.5e3`.
    Number(String),
    Bool(bool),
    Null,
    /// A bare identifier used as a value.
    Symbol(String),
    /// `!literal<dynamic>literal`
    Path(Vec<PathSegment>),
}

/// One `key: value` pair of an object value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: ObjectKey,
    pub value: Value,
    pub span: Span,
}

/// Object keys are either quoted strings or bare symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ObjectKey {
    /// Decoded text of a quoted key; the span covers the quotes.
    String { text: String, span: Span },
    Symbol(Identifier),
}

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String { text, .. } => text,
            Self::Symbol(name) => name.as_str(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::String { span, .. } => *span,
            Self::Symbol(name) => name.span,
        }
    }
}

/// A piece of a path value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PathSegment {
    /// A run of URI-safe characters, copied verbatim.
    Literal { text: String, span: Span },
    /// A `<name[:type][~example]>` placeholder.
    Dynamic(PathDynamic),
}

/// A dynamic path segment such as `<id: Int ~ 42>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathDynamic {
    pub name: Identifier,
    pub type_decl: Option<TypeDeclaration>,
    pub example: Option<Value>,
    pub span: Span,
}

impl Value {
    pub fn new(kind: ValueKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Atomic values are everything except objects and arrays.
    pub fn is_atomic(&self) -> bool {
        !matches!(self.kind, ValueKind::Object(_) | ValueKind::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.kind {
            ValueKind::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// The number as an integer, if the lexeme has no fraction or exponent.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            ValueKind::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Object(entries) => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match &entry.key {
                        ObjectKey::String { text, .. } => {
                            write!(f, "\"{}\"", escape_string(text))?
                        }
                        ObjectKey::Symbol(name) => write!(f, "{name}")?,
                    }
                    write!(f, ": {}", entry.value)?;
                }
                f.write_str("}")
            }
            ValueKind::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ValueKind::String(s) => write!(f, "\"{}\"", escape_string(s)),
            ValueKind::Number(n) => f.write_str(n),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Null => f.write_str("null"),
            ValueKind::Symbol(s) => f.write_str(s),
            ValueKind::Path(segments) => {
                f.write_str("!")?;
                for segment in segments {
                    write!(f, "{segment}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { text, .. } => f.write_str(text),
            Self::Dynamic(dynamic) => {
                write!(f, "<{}", dynamic.name)?;
                if let Some(decl) = &dynamic.type_decl {
                    write!(f, "{decl}")?;
                }
                if let Some(example) = &dynamic.example {
                    write!(f, " ~ {example}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// Escape a decoded string so it can be written back between double quotes.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
