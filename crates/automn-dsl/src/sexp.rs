//! S-expression dump of a syntax tree.
//!
//! Every node becomes `(kind child...)`; names and numbers are bare atoms,
//! strings are quoted. Spans are left out, so two trees that differ only in
//! layout dump identically.

use std::fmt;

use automn_core::{
    escape_string, AssociatedModel, Definition, Describer, DescriberKind, Enum, EnumMember, Field,
    FieldMember, FieldName, Function, FunctionMember, Model, ModelMember, ObjectKey, PathSegment,
    ReturnField, SourceFile, TypeDeclaration, TypeExpr, TypeKind, Value, ValueKind, Variant,
    VariantMember,
};

const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Atom(String),
    List(&'static str, Vec<Sexp>),
}

impl Sexp {
    fn atom(text: impl Into<String>) -> Self {
        Self::Atom(text.into())
    }

    fn quoted(text: &str) -> Self {
        Self::Atom(format!("\"{}\"", escape_string(text)))
    }

    /// Renders with one child per line wherever the compact form would
    /// overflow the line.
    pub fn pretty(&self) -> String {
        let mut output = String::new();
        self.write_pretty(&mut output, 0);
        output
    }

    fn write_pretty(&self, output: &mut String, depth: usize) {
        let compact = self.to_string();
        match self {
            Self::List(kind, children) if depth * 2 + compact.len() > LINE_WIDTH => {
                output.push('(');
                output.push_str(kind);
                for child in children {
                    output.push('\n');
                    output.push_str(&"  ".repeat(depth + 1));
                    child.write_pretty(output, depth + 1);
                }
                output.push(')');
            }
            _ => output.push_str(&compact),
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(text),
            Self::List(kind, children) => {
                write!(f, "({kind}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Compact single-line dump of a source file.
pub fn to_sexp(file: &SourceFile) -> String {
    source_file(file).to_string()
}

/// Dump of a source file, broken across lines to fit 80 columns.
pub fn to_sexp_pretty(file: &SourceFile) -> String {
    source_file(file).pretty()
}

pub fn source_file(file: &SourceFile) -> Sexp {
    Sexp::List("source_file", file.definitions.iter().map(definition).collect())
}

fn definition(definition: &Definition) -> Sexp {
    match definition {
        Definition::Model(m) => model(m),
        Definition::Function(f) => function("function", f),
        Definition::Enum(e) => enumeration(e),
    }
}

fn model(model: &Model) -> Sexp {
    let mut children = vec![Sexp::atom(model.name.as_str())];
    children.extend(
        model
            .modifiers
            .iter()
            .map(|m| Sexp::List("modifier", vec![value(m)])),
    );
    children.extend(
        model
            .mixins
            .iter()
            .map(|m| Sexp::List("mixin", vec![Sexp::atom(m.name.as_str())])),
    );
    children.extend(model.members.iter().map(model_member));
    Sexp::List("model", children)
}

fn associated(model: &AssociatedModel) -> Sexp {
    let mut children = vec![Sexp::atom(model.name.as_str())];
    children.extend(
        model
            .modifiers
            .iter()
            .map(|m| Sexp::List("modifier", vec![value(m)])),
    );
    children.extend(model.members.iter().map(model_member));
    Sexp::List("associated_model", children)
}

fn model_member(member: &ModelMember) -> Sexp {
    match member {
        ModelMember::Field(f) => field(f),
        ModelMember::Describer(d) => describer(d),
        ModelMember::Method(m) => function("method", m),
        ModelMember::Associated(a) => associated(a),
    }
}

fn field(field: &Field) -> Sexp {
    let name = match &field.name {
        FieldName::Static(name) => Sexp::atom(name.as_str()),
        FieldName::Dynamic(dynamic) => {
            let mut children = vec![Sexp::atom(dynamic.name.as_str())];
            children.extend(dynamic.type_decl.as_ref().map(type_declaration));
            Sexp::List("dynamic_field", children)
        }
    };
    let mut children = vec![name];
    field_tail(
        &mut children,
        field.type_decl.as_ref(),
        field.example.as_ref(),
        field.default.as_ref(),
        &field.members,
    );
    Sexp::List("field", children)
}

fn return_field(field: &ReturnField) -> Sexp {
    let mut children = vec![Sexp::atom(field.name.as_str())];
    field_tail(
        &mut children,
        field.type_decl.as_ref(),
        field.example.as_ref(),
        field.default.as_ref(),
        &field.members,
    );
    Sexp::List("return_field", children)
}

fn field_tail(
    children: &mut Vec<Sexp>,
    type_decl: Option<&TypeDeclaration>,
    example: Option<&Value>,
    default: Option<&Value>,
    members: &[FieldMember],
) {
    children.extend(type_decl.map(type_declaration));
    children.extend(example.map(|v| Sexp::List("example", vec![value(v)])));
    children.extend(default.map(|v| Sexp::List("default", vec![value(v)])));
    children.extend(members.iter().map(field_member));
}

fn field_member(member: &FieldMember) -> Sexp {
    match member {
        FieldMember::Describer(d) => describer(d),
        FieldMember::Type(decl) => type_declaration(decl),
        FieldMember::Example(v) => Sexp::List("example", vec![value(v)]),
        FieldMember::Default(v) => Sexp::List("default", vec![value(v)]),
        FieldMember::Context(context) => Sexp::List(
            "context_type",
            vec![Sexp::atom(context.context.as_str()), type_expr(&context.ty)],
        ),
    }
}

fn function(kind: &'static str, function: &Function) -> Sexp {
    let mut children = vec![Sexp::atom(function.name.as_str())];
    children.extend(function.members.iter().map(|member| match member {
        FunctionMember::Field(f) => field(f),
        FunctionMember::Describer(d) => describer(d),
        FunctionMember::Return(r) => return_field(r),
    }));
    Sexp::List(kind, children)
}

fn enumeration(e: &Enum) -> Sexp {
    let mut children = vec![Sexp::atom(e.name.as_str())];
    children.extend(e.type_decl.as_ref().map(type_declaration));
    children.extend(e.members.iter().map(|member| match member {
        EnumMember::Variant(v) => variant(v),
        EnumMember::Describer(d) => describer(d),
    }));
    Sexp::List("enum", children)
}

fn variant(variant: &Variant) -> Sexp {
    let mut children = vec![Sexp::atom(variant.name.as_str())];
    if !variant.parameters.is_empty() {
        children.push(Sexp::List(
            "parameters",
            variant.parameters.iter().map(type_expr).collect(),
        ));
    }
    children.extend(
        variant
            .default
            .as_ref()
            .map(|v| Sexp::List("default", vec![value(v)])),
    );
    children.extend(variant.members.iter().map(|member| match member {
        VariantMember::Describer(d) => describer(d),
        VariantMember::Default(v) => Sexp::List("default", vec![value(v)]),
    }));
    Sexp::List("variant", children)
}

fn describer(describer: &Describer) -> Sexp {
    match &describer.kind {
        DescriberKind::Tags(tags) => Sexp::List(
            "tags",
            tags.iter().map(|t| Sexp::atom(t.as_str())).collect(),
        ),
        DescriberKind::Property { key, value: v } => {
            Sexp::List("property", vec![Sexp::atom(key.as_str()), value(v)])
        }
        DescriberKind::Doc(text) => Sexp::List("doc", vec![Sexp::quoted(text)]),
        DescriberKind::DocBlock(lines) => Sexp::List(
            "doc_block",
            lines.iter().map(|line| Sexp::quoted(&line.text)).collect(),
        ),
    }
}

fn type_declaration(decl: &TypeDeclaration) -> Sexp {
    let kind = if decl.optional {
        "optional_type_decl"
    } else {
        "type_decl"
    };
    Sexp::List(kind, vec![type_expr(&decl.ty)])
}

fn type_expr(ty: &TypeExpr) -> Sexp {
    match &ty.kind {
        TypeKind::Atomic { name, arguments } => {
            let mut children = vec![Sexp::atom(name.as_str())];
            children.extend(arguments.iter().map(value));
            Sexp::List("atomic_type", children)
        }
        TypeKind::Array(element) => Sexp::List("array_type", vec![type_expr(element)]),
        TypeKind::Union(members) => Sexp::List("union_type", members.iter().map(type_expr).collect()),
        TypeKind::InlineEnum(variants) => Sexp::List(
            "inline_enum",
            variants.iter().map(|v| Sexp::atom(v.as_str())).collect(),
        ),
    }
}

fn value(v: &Value) -> Sexp {
    match &v.kind {
        ValueKind::Object(entries) => Sexp::List(
            "object",
            entries
                .iter()
                .map(|entry| {
                    let key = match &entry.key {
                        ObjectKey::String { text, .. } => Sexp::quoted(text),
                        ObjectKey::Symbol(name) => Sexp::atom(name.as_str()),
                    };
                    Sexp::List("entry", vec![key, value(&entry.value)])
                })
                .collect(),
        ),
        ValueKind::Array(items) => Sexp::List("array", items.iter().map(value).collect()),
        ValueKind::String(s) => Sexp::quoted(s),
        ValueKind::Number(n) => Sexp::atom(n.as_str()),
        ValueKind::Bool(b) => Sexp::atom(b.to_string()),
        ValueKind::Null => Sexp::atom("null"),
        ValueKind::Symbol(s) => Sexp::List("symbol", vec![Sexp::atom(s.as_str())]),
        ValueKind::Path(segments) => Sexp::List(
            "path",
            segments
                .iter()
                .map(|segment| match segment {
                    PathSegment::Literal { text, .. } => Sexp::quoted(text),
                    PathSegment::Dynamic(dynamic) => {
                        let mut children = vec![Sexp::atom(dynamic.name.as_str())];
                        children.extend(dynamic.type_decl.as_ref().map(type_declaration));
                        children.extend(
                            dynamic
                                .example
                                .as_ref()
                                .map(|v| Sexp::List("example", vec![value(v)])),
                        );
                        Sexp::List("placeholder", children)
                    }
                })
                .collect(),
        ),
    }
}
