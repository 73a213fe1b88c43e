//! Depth-first, pre-order traversal of a syntax tree.
//!
//! Implement [`Visitor`] and override the hooks for the node kinds you care
//! about. Each default hook calls the matching `walk_*` function, which
//! recurses into the node's children in source order. An override that still
//! wants the children visited calls `walk_*` itself.

use crate::ast::{
    AssociatedModel, Definition, Describer, DescriberKind, Enum, EnumMember, Field, FieldMember,
    FieldName, Function, FunctionMember, Model, ModelMember, PathSegment, ReturnField,
    SourceFile, TypeDeclaration, TypeExpr, TypeKind, Value, ValueKind, Variant, VariantMember,
};

pub trait Visitor {
    fn visit_definition(&mut self, definition: &Definition) {
        walk_definition(self, definition);
    }

    fn visit_model(&mut self, model: &Model) {
        walk_model(self, model);
    }

    fn visit_associated_model(&mut self, model: &AssociatedModel) {
        walk_associated_model(self, model);
    }

    fn visit_field(&mut self, field: &Field) {
        walk_field(self, field);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    fn visit_return_field(&mut self, field: &ReturnField) {
        walk_return_field(self, field);
    }

    fn visit_enum(&mut self, e: &Enum) {
        walk_enum(self, e);
    }

    fn visit_variant(&mut self, variant: &Variant) {
        walk_variant(self, variant);
    }

    fn visit_describer(&mut self, describer: &Describer) {
        walk_describer(self, describer);
    }

    fn visit_type(&mut self, ty: &TypeExpr) {
        walk_type(self, ty);
    }

    fn visit_value(&mut self, value: &Value) {
        walk_value(self, value);
    }
}

pub fn walk_source_file<V: Visitor + ?Sized>(visitor: &mut V, file: &SourceFile) {
    for definition in &file.definitions {
        visitor.visit_definition(definition);
    }
}

pub fn walk_definition<V: Visitor + ?Sized>(visitor: &mut V, definition: &Definition) {
    match definition {
        Definition::Model(model) => visitor.visit_model(model),
        Definition::Function(function) => visitor.visit_function(function),
        Definition::Enum(e) => visitor.visit_enum(e),
    }
}

pub fn walk_model<V: Visitor + ?Sized>(visitor: &mut V, model: &Model) {
    for modifier in &model.modifiers {
        visitor.visit_value(modifier);
    }
    walk_model_members(visitor, &model.members);
}

pub fn walk_associated_model<V: Visitor + ?Sized>(visitor: &mut V, model: &AssociatedModel) {
    for modifier in &model.modifiers {
        visitor.visit_value(modifier);
    }
    walk_model_members(visitor, &model.members);
}

fn walk_model_members<V: Visitor + ?Sized>(visitor: &mut V, members: &[ModelMember]) {
    for member in members {
        match member {
            ModelMember::Field(field) => visitor.visit_field(field),
            ModelMember::Describer(describer) => visitor.visit_describer(describer),
            ModelMember::Method(method) => visitor.visit_function(method),
            ModelMember::Associated(assoc) => visitor.visit_associated_model(assoc),
        }
    }
}

pub fn walk_field<V: Visitor + ?Sized>(visitor: &mut V, field: &Field) {
    if let FieldName::Dynamic(dynamic) = &field.name {
        walk_type_declaration(visitor, dynamic.type_decl.as_ref());
    }
    walk_type_declaration(visitor, field.type_decl.as_ref());
    walk_optional_values(visitor, [field.example.as_ref(), field.default.as_ref()]);
    walk_field_members(visitor, &field.members);
}

pub fn walk_return_field<V: Visitor + ?Sized>(visitor: &mut V, field: &ReturnField) {
    walk_type_declaration(visitor, field.type_decl.as_ref());
    walk_optional_values(visitor, [field.example.as_ref(), field.default.as_ref()]);
    walk_field_members(visitor, &field.members);
}

fn walk_field_members<V: Visitor + ?Sized>(visitor: &mut V, members: &[FieldMember]) {
    for member in members {
        match member {
            FieldMember::Describer(describer) => visitor.visit_describer(describer),
            FieldMember::Type(decl) => visitor.visit_type(&decl.ty),
            FieldMember::Example(value) | FieldMember::Default(value) => {
                visitor.visit_value(value)
            }
            FieldMember::Context(context) => visitor.visit_type(&context.ty),
        }
    }
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, function: &Function) {
    for member in &function.members {
        match member {
            FunctionMember::Field(field) => visitor.visit_field(field),
            FunctionMember::Describer(describer) => visitor.visit_describer(describer),
            FunctionMember::Return(ret) => visitor.visit_return_field(ret),
        }
    }
}

pub fn walk_enum<V: Visitor + ?Sized>(visitor: &mut V, e: &Enum) {
    walk_type_declaration(visitor, e.type_decl.as_ref());
    for member in &e.members {
        match member {
            EnumMember::Variant(variant) => visitor.visit_variant(variant),
            EnumMember::Describer(describer) => visitor.visit_describer(describer),
        }
    }
}

pub fn walk_variant<V: Visitor + ?Sized>(visitor: &mut V, variant: &Variant) {
    for parameter in &variant.parameters {
        visitor.visit_type(parameter);
    }
    if let Some(default) = &variant.default {
        visitor.visit_value(default);
    }
    for member in &variant.members {
        match member {
            VariantMember::Describer(describer) => visitor.visit_describer(describer),
            VariantMember::Default(value) => visitor.visit_value(value),
        }
    }
}

pub fn walk_describer<V: Visitor + ?Sized>(visitor: &mut V, describer: &Describer) {
    if let DescriberKind::Property { value, .. } = &describer.kind {
        visitor.visit_value(value);
    }
}

pub fn walk_type<V: Visitor + ?Sized>(visitor: &mut V, ty: &TypeExpr) {
    match &ty.kind {
        TypeKind::Atomic { arguments, .. } => {
            for argument in arguments {
                visitor.visit_value(argument);
            }
        }
        TypeKind::Array(element) => visitor.visit_type(element),
        TypeKind::Union(members) => {
            for member in members {
                visitor.visit_type(member);
            }
        }
        TypeKind::InlineEnum(_) => {}
    }
}

pub fn walk_value<V: Visitor + ?Sized>(visitor: &mut V, value: &Value) {
    match &value.kind {
        ValueKind::Object(entries) => {
            for entry in entries {
                visitor.visit_value(&entry.value);
            }
        }
        ValueKind::Array(items) => {
            for item in items {
                visitor.visit_value(item);
            }
        }
        ValueKind::Path(segments) => {
            for segment in segments {
                if let PathSegment::Dynamic(dynamic) = segment {
                    walk_type_declaration(visitor, dynamic.type_decl.as_ref());
                    if let Some(example) = &dynamic.example {
                        visitor.visit_value(example);
                    }
                }
            }
        }
        ValueKind::String(_)
        | ValueKind::Number(_)
        | ValueKind::Bool(_)
        | ValueKind::Null
        | ValueKind::Symbol(_) => {}
    }
}

fn walk_type_declaration<V: Visitor + ?Sized>(visitor: &mut V, decl: Option<&TypeDeclaration>) {
    if let Some(decl) = decl {
        visitor.visit_type(&decl.ty);
    }
}

fn walk_optional_values<V: Visitor + ?Sized, const N: usize>(
    visitor: &mut V,
    values: [Option<&Value>; N],
) {
    for value in values.into_iter().flatten() {
        visitor.visit_value(value);
    }
}
