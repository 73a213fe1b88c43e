use serde::{Deserialize, Serialize};

use super::describer::Describer;
use super::identifier::Identifier;
use super::types::{TypeDeclaration, TypeExpr};
use super::value::Value;
use crate::span::Span;

/// A field of a model or a parameter of a function.
///
/// ```text
/// name: String ~ "Ada" = "anonymous"
///   > Display name
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: FieldName,
    pub type_decl: Option<TypeDeclaration>,
    /// `~ value`
    pub example: Option<Value>,
    /// `= value`
    pub default: Option<Value>,
    pub members: Vec<FieldMember>,
    pub span: Span,
}

/// The head of a field: a fixed identifier or a `<placeholder>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FieldName {
    Static(Identifier),
    Dynamic(DynamicField),
}

/// `<name[:type]>`: a field whose name is a pattern, e.g. map keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicField {
    pub name: Identifier,
    pub type_decl: Option<TypeDeclaration>,
    pub span: Span,
}

/// A line inside a field's indented body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FieldMember {
    Describer(Describer),
    Type(TypeDeclaration),
    Example(Value),
    Default(Value),
    Context(ContextType),
}

/// `: context : type` inside a field body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextType {
    pub context: Identifier,
    pub ty: TypeExpr,
    pub span: Span,
}

impl FieldName {
    /// The identifier of the field, whether static or dynamic.
    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Static(ident) => ident,
            Self::Dynamic(dynamic) => &dynamic.name,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl Field {
    pub fn name_str(&self) -> &str {
        self.name.identifier().as_str()
    }

    /// Whether the head declaration used the `?` marker.
    pub fn is_optional(&self) -> bool {
        self.type_decl.as_ref().is_some_and(|decl| decl.optional)
    }

    /// The type expression declared on the field head.
    pub fn ty(&self) -> Option<&TypeExpr> {
        self.type_decl.as_ref().map(|decl| &decl.ty)
    }

    pub fn describers(&self) -> impl Iterator<Item = &Describer> {
        self.members.iter().filter_map(|member| match member {
            FieldMember::Describer(d) => Some(d),
            _ => None,
        })
    }
}
