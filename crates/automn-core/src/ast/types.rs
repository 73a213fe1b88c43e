use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::Identifier;
use super::value::Value;
use crate::span::Span;

/// A `: type` or `?[:] type` annotation. The `?` form marks the annotated
/// field or segment as optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub optional: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

/// The shape of a [`TypeExpr`].
///
/// Union members are never unions themselves, and an inline enum always has
/// at least two variants; the parser only builds these shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TypeKind {
    /// `Name` or `Name(arg, arg)` with atomic value arguments.
    Atomic {
        name: Identifier,
        arguments: Vec<Value>,
    },
    /// `[T]`
    Array(Box<TypeExpr>),
    /// `A | B | C`
    Union(Vec<TypeExpr>),
    /// `Red, Green, Blue`
    InlineEnum(Vec<Identifier>),
}

impl TypeExpr {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The name of an atomic type, `None` for every other shape.
    pub fn atomic_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Atomic { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self.kind, TypeKind::Union(_))
    }

    pub fn is_inline_enum(&self) -> bool {
        matches!(self.kind, TypeKind::InlineEnum(_))
    }

    /// Whether an inline enum appears anywhere inside this type.
    pub fn contains_inline_enum(&self) -> bool {
        match &self.kind {
            TypeKind::Atomic { .. } => false,
            TypeKind::InlineEnum(_) => true,
            TypeKind::Array(element) => element.contains_inline_enum(),
            TypeKind::Union(members) => members.iter().any(TypeExpr::contains_inline_enum),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Atomic { name, arguments } => {
                write!(f, "{name}")?;
                if !arguments.is_empty() {
                    f.write_str("(")?;
                    for (i, arg) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            TypeKind::Array(element) => write!(f, "[{element}]"),
            TypeKind::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            TypeKind::InlineEnum(variants) => {
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{variant}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "?: {}", self.ty)
        } else {
            write!(f, ": {}", self.ty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ValueKind;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, Span::default())
    }

    fn atomic(name: &str) -> TypeExpr {
        TypeExpr::new(
            TypeKind::Atomic {
                name: ident(name),
                arguments: vec![],
            },
            Span::default(),
        )
    }

    #[test]
    fn display_atomic_with_arguments() {
        let ty = TypeExpr::new(
            TypeKind::Atomic {
                name: ident("String"),
                arguments: vec![Value::new(ValueKind::Number("255".into()), Span::default())],
            },
            Span::default(),
        );
        assert_eq!(ty.to_string(), "String(255)");
        assert_eq!(ty.atomic_name(), Some("String"));
    }

    #[test]
    fn display_union_of_inline_enum() {
        let ty = TypeExpr::new(
            TypeKind::Union(vec![
                TypeExpr::new(
                    TypeKind::InlineEnum(vec![ident("Red"), ident("Green")]),
                    Span::default(),
                ),
                atomic("Int"),
            ]),
            Span::default(),
        );
        assert_eq!(ty.to_string(), "Red, Green | Int");
        assert!(ty.is_union());
        assert!(ty.contains_inline_enum());
    }

    #[test]
    fn display_array_and_declaration() {
        let array = TypeExpr::new(TypeKind::Array(Box::new(atomic("Tag"))), Span::default());
        assert_eq!(array.to_string(), "[Tag]");
        assert!(!array.contains_inline_enum());

        let decl = TypeDeclaration {
            optional: true,
            ty: array,
            span: Span::default(),
        };
        assert_eq!(decl.to_string(), "?: [Tag]");
    }
}
