use serde::{Deserialize, Serialize};

use super::describer::Describer;
use super::field::{Field, FieldMember};
use super::identifier::Identifier;
use super::types::TypeDeclaration;
use super::value::Value;
use crate::span::Span;

/// `name()` with an optional body of parameters, describers and return
/// fields. Appears at the top level and as a method inside model bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: Identifier,
    pub members: Vec<FunctionMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FunctionMember {
    Field(Field),
    Describer(Describer),
    Return(ReturnField),
}

/// `-> name: Type ...`: a named result of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnField {
    pub name: Identifier,
    pub type_decl: Option<TypeDeclaration>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub members: Vec<FieldMember>,
    pub span: Span,
}

impl Function {
    pub fn parameters(&self) -> impl Iterator<Item = &Field> {
        self.members.iter().filter_map(|member| match member {
            FunctionMember::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn returns(&self) -> impl Iterator<Item = &ReturnField> {
        self.members.iter().filter_map(|member| match member {
            FunctionMember::Return(ret) => Some(ret),
            _ => None,
        })
    }
}
