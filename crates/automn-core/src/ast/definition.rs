use serde::{Deserialize, Serialize};

use super::describer::Describer;
use super::enumeration::Enum;
use super::field::Field;
use super::function::Function;
use super::identifier::Identifier;
use super::value::Value;
use crate::span::Span;

/// The root of a parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub definitions: Vec<Definition>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Definition {
    Model(Model),
    Function(Function),
    Enum(Enum),
}

/// A named schema declaration.
///
/// ```text
/// User "users" &Timestamps
///   name: String
///   /Address
///     street: String
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: Identifier,
    /// Atomic values written after the name.
    pub modifiers: Vec<Value>,
    pub mixins: Vec<Mixin>,
    /// Body members in source order; empty when the model has no body.
    pub members: Vec<ModelMember>,
    pub span: Span,
}

/// `&Name`: fields of another model included by composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mixin {
    pub name: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ModelMember {
    Field(Field),
    Describer(Describer),
    Method(Function),
    Associated(AssociatedModel),
}

/// `/Name`: a model nested in and scoped to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedModel {
    pub name: Identifier,
    pub modifiers: Vec<Value>,
    pub members: Vec<ModelMember>,
    pub span: Span,
}

impl SourceFile {
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Model(model) => Some(model),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Function(function) => Some(function),
            _ => None,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &Enum> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Enum(e) => Some(e),
            _ => None,
        })
    }

    /// Looks up a top-level definition by name.
    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|def| def.name() == name)
    }
}

impl Definition {
    pub fn name(&self) -> &Identifier {
        match self {
            Self::Model(model) => &model.name,
            Self::Function(function) => &function.name,
            Self::Enum(e) => &e.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Model(model) => model.span,
            Self::Function(function) => function.span,
            Self::Enum(e) => e.span,
        }
    }

    /// Lowercase node kind, as used in tree dumps.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Function(_) => "function",
            Self::Enum(_) => "enum",
        }
    }
}

impl Model {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        fields_of(&self.members)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name_str() == name)
    }

    pub fn associated(&self) -> impl Iterator<Item = &AssociatedModel> {
        self.members.iter().filter_map(|member| match member {
            ModelMember::Associated(assoc) => Some(assoc),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &Function> {
        self.members.iter().filter_map(|member| match member {
            ModelMember::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn describers(&self) -> impl Iterator<Item = &Describer> {
        self.members.iter().filter_map(|member| match member {
            ModelMember::Describer(d) => Some(d),
            _ => None,
        })
    }
}

impl AssociatedModel {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        fields_of(&self.members)
    }
}

fn fields_of(members: &[ModelMember]) -> impl Iterator<Item = &Field> {
    members.iter().filter_map(|member| match member {
        ModelMember::Field(field) => Some(field),
        _ => None,
    })
}
