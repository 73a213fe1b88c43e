//! Syntax tree node types.
//!
//! The hierarchy mirrors the DSL: a [`SourceFile`] holds [`Definition`]s
//! (models, functions, enums); bodies hold members; fields and variants refer
//! to [`TypeExpr`]s and [`Value`]s. Describers (tags, properties,
//! documentation) appear interleaved with the structural members of any body,
//! in source order.

mod definition;
mod describer;
mod enumeration;
mod field;
mod function;
mod identifier;
mod types;
mod value;

pub use definition::{AssociatedModel, Definition, Mixin, Model, ModelMember, SourceFile};
pub use describer::{Describer, DescriberKind, DocLine};
pub use enumeration::{Enum, EnumMember, Variant, VariantMember};
pub use field::{ContextType, DynamicField, Field, FieldMember, FieldName};
pub use function::{Function, FunctionMember, ReturnField};
pub use identifier::Identifier;
pub use types::{TypeDeclaration, TypeExpr, TypeKind};
pub use value::{escape_string, ObjectEntry, ObjectKey, PathDynamic, PathSegment, Value, ValueKind};
