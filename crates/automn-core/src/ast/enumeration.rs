use serde::{Deserialize, Serialize};

use super::describer::Describer;
use super::identifier::Identifier;
use super::types::{TypeDeclaration, TypeExpr};
use super::value::Value;
use crate::span::Span;

/// `|Name[: type]` followed by an indented list of variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub name: Identifier,
    pub type_decl: Option<TypeDeclaration>,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EnumMember {
    Variant(Variant),
    Describer(Describer),
}

/// One alternative of an enum, optionally parameterized:
/// `Circle(Float) = 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: Identifier,
    /// Parameter types; never inline enums.
    pub parameters: Vec<TypeExpr>,
    pub default: Option<Value>,
    pub members: Vec<VariantMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum VariantMember {
    Describer(Describer),
    Default(Value),
}

impl Enum {
    /// Variants in declaration order, skipping describers.
    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.members.iter().filter_map(|member| match member {
            EnumMember::Variant(variant) => Some(variant),
            EnumMember::Describer(_) => None,
        })
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants().find(|v| v.name == name)
    }
}
