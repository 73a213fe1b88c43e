use automn_core::{
    AssociatedModel, Definition, Describer, DescriberKind, Enum, EnumMember, Field, FieldMember,
    FieldName, Function, FunctionMember, Model, ModelMember, ReturnField, SourceFile,
    TypeDeclaration, Value, Variant, VariantMember,
};

const INDENT: &str = "  ";

/// Print a source file back to DSL text.
///
/// Bodies are indented by two spaces per level and definitions are
/// separated by blank lines. Parsing the output yields the same tree,
/// apart from spans.
pub fn print(file: &SourceFile) -> String {
    let mut output = String::new();
    for (i, definition) in file.definitions.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        print_definition_into(definition, &mut output);
    }
    output
}

/// Print a single top-level definition.
pub fn print_definition(definition: &Definition) -> String {
    let mut output = String::new();
    print_definition_into(definition, &mut output);
    output
}

fn print_definition_into(definition: &Definition, output: &mut String) {
    match definition {
        Definition::Model(model) => print_model(model, output),
        Definition::Function(function) => print_function(function, output, 0),
        Definition::Enum(e) => print_enum(e, output),
    }
}

fn indent(output: &mut String, depth: usize) {
    for _ in 0..depth {
        output.push_str(INDENT);
    }
}

fn print_model(model: &Model, output: &mut String) {
    output.push_str(model.name.as_str());
    print_modifiers(&model.modifiers, output);
    for mixin in &model.mixins {
        output.push_str(" &");
        output.push_str(mixin.name.as_str());
    }
    output.push('\n');
    print_model_members(&model.members, output, 1);
}

fn print_associated(model: &AssociatedModel, output: &mut String, depth: usize) {
    indent(output, depth);
    output.push('/');
    output.push_str(model.name.as_str());
    print_modifiers(&model.modifiers, output);
    output.push('\n');
    print_model_members(&model.members, output, depth + 1);
}

fn print_modifiers(modifiers: &[Value], output: &mut String) {
    for modifier in modifiers {
        output.push(' ');
        output.push_str(&modifier.to_string());
    }
}

fn print_model_members(members: &[ModelMember], output: &mut String, depth: usize) {
    for member in members {
        match member {
            ModelMember::Field(field) => print_field(field, output, depth),
            ModelMember::Describer(describer) => print_describer(describer, output, depth),
            ModelMember::Method(method) => print_function(method, output, depth),
            ModelMember::Associated(assoc) => print_associated(assoc, output, depth),
        }
    }
}

fn print_field(field: &Field, output: &mut String, depth: usize) {
    indent(output, depth);
    match &field.name {
        FieldName::Static(name) => output.push_str(name.as_str()),
        FieldName::Dynamic(dynamic) => {
            output.push('<');
            output.push_str(dynamic.name.as_str());
            if let Some(decl) = &dynamic.type_decl {
                output.push_str(&decl.to_string());
            }
            output.push('>');
        }
    }
    print_field_tail(
        field.type_decl.as_ref(),
        field.example.as_ref(),
        field.default.as_ref(),
        output,
    );
    output.push('\n');
    print_field_members(&field.members, output, depth + 1);
}

fn print_return_field(field: &ReturnField, output: &mut String, depth: usize) {
    indent(output, depth);
    output.push_str("-> ");
    output.push_str(field.name.as_str());
    print_field_tail(
        field.type_decl.as_ref(),
        field.example.as_ref(),
        field.default.as_ref(),
        output,
    );
    output.push('\n');
    print_field_members(&field.members, output, depth + 1);
}

fn print_field_tail(
    type_decl: Option<&TypeDeclaration>,
    example: Option<&Value>,
    default: Option<&Value>,
    output: &mut String,
) {
    if let Some(decl) = type_decl {
        output.push_str(&decl.to_string());
    }
    if let Some(example) = example {
        output.push_str(&format!(" ~ {example}"));
    }
    if let Some(default) = default {
        output.push_str(&format!(" = {default}"));
    }
}

fn print_field_members(members: &[FieldMember], output: &mut String, depth: usize) {
    for member in members {
        match member {
            FieldMember::Describer(describer) => print_describer(describer, output, depth),
            FieldMember::Type(decl) => {
                indent(output, depth);
                output.push_str(&decl.to_string());
                output.push('\n');
            }
            FieldMember::Example(value) => {
                indent(output, depth);
                output.push_str(&format!("~ {value}\n"));
            }
            FieldMember::Default(value) => {
                indent(output, depth);
                output.push_str(&format!("= {value}\n"));
            }
            FieldMember::Context(context) => {
                indent(output, depth);
                output.push_str(&format!(": {} : {}\n", context.context, context.ty));
            }
        }
    }
}

fn print_function(function: &Function, output: &mut String, depth: usize) {
    indent(output, depth);
    output.push_str(function.name.as_str());
    output.push_str("()\n");
    for member in &function.members {
        match member {
            FunctionMember::Field(field) => print_field(field, output, depth + 1),
            FunctionMember::Describer(describer) => print_describer(describer, output, depth + 1),
            FunctionMember::Return(ret) => print_return_field(ret, output, depth + 1),
        }
    }
}

fn print_enum(e: &Enum, output: &mut String) {
    output.push('|');
    output.push_str(e.name.as_str());
    if let Some(decl) = &e.type_decl {
        output.push_str(&decl.to_string());
    }
    output.push('\n');
    for member in &e.members {
        match member {
            EnumMember::Variant(variant) => print_variant(variant, output, 1),
            EnumMember::Describer(describer) => print_describer(describer, output, 1),
        }
    }
}

fn print_variant(variant: &Variant, output: &mut String, depth: usize) {
    indent(output, depth);
    output.push_str(variant.name.as_str());
    if !variant.parameters.is_empty() {
        let parameters: Vec<String> = variant.parameters.iter().map(ToString::to_string).collect();
        output.push_str(&format!("({})", parameters.join(", ")));
    }
    if let Some(default) = &variant.default {
        output.push_str(&format!(" = {default}"));
    }
    output.push('\n');
    for member in &variant.members {
        match member {
            VariantMember::Describer(describer) => print_describer(describer, output, depth + 1),
            VariantMember::Default(value) => {
                indent(output, depth + 1);
                output.push_str(&format!("= {value}\n"));
            }
        }
    }
}

fn print_describer(describer: &Describer, output: &mut String, depth: usize) {
    indent(output, depth);
    match &describer.kind {
        DescriberKind::Tags(tags) => {
            let tags: Vec<&str> = tags.iter().map(|t| t.as_str()).collect();
            output.push_str(&format!("[{}]", tags.join(", ")));
        }
        DescriberKind::Property { key, value } => {
            output.push_str(&format!("{key} :: {value}"));
        }
        DescriberKind::Doc(text) if text.is_empty() => output.push('>'),
        DescriberKind::Doc(text) => output.push_str(&format!("> {text}")),
        DescriberKind::DocBlock(lines) => {
            output.push_str(">>\n");
            // Blank lines cannot be represented inside a block.
            for line in lines.iter().filter(|l| !l.text.trim().is_empty()) {
                indent(output, depth + 1);
                output.push_str(line.text.trim_end());
                output.push('\n');
            }
            return;
        }
    }
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn reprint(source: &str) -> String {
        print(&parse(source).expect("parse failed"))
    }

    #[test]
    fn print_model_with_fields() {
        assert_eq!(
            reprint("User   \"users\" &Base\n    name:String\n    age ?Int = 0"),
            "User \"users\" &Base\n  name: String\n  age?: Int = 0\n"
        );
    }

    #[test]
    fn print_field_body() {
        let source = "M\n  id: Uuid ~ \"x\"\n    > Primary key\n    [pk]\n    : db : Binary(16)\n    = null";
        assert_eq!(
            reprint(source),
            "M\n  id: Uuid ~ \"x\"\n    > Primary key\n    [pk]\n    : db : Binary(16)\n    = null\n"
        );
    }

    #[test]
    fn print_types() {
        let source = "M\n  a: [Red, Green | Blue]\n  b: Decimal(10, 2) | Null\n  <k: String>: Int";
        assert_eq!(
            reprint(source),
            "M\n  a: [Red, Green | Blue]\n  b: Decimal(10, 2) | Null\n  <k: String>: Int\n"
        );
    }

    #[test]
    fn print_enum_and_function() {
        let source = "|Shape: Int\n  Circle(Float) = 1\n    > round\n  Square\n\nlogin()\n  email: String\n  -> token: String";
        assert_eq!(
            reprint(source),
            "|Shape: Int\n  Circle(Float) = 1\n    > round\n  Square\n\nlogin()\n  email: String\n  -> token: String\n"
        );
    }

    #[test]
    fn print_associated_and_method() {
        let source = "Order\n  /Line 2\n    sku: String\n  total()\n    -> sum: Int";
        assert_eq!(
            reprint(source),
            "Order\n  /Line 2\n    sku: String\n  total()\n    -> sum: Int\n"
        );
    }

    #[test]
    fn print_documentation() {
        let source = "M\n  >\n  >>\n    one\n      two\n  meta :: {a: [1, \"b\\n\"]}";
        assert_eq!(
            reprint(source),
            "M\n  >\n  >>\n    one\n      two\n  meta :: {a: [1, \"b\\n\"]}\n"
        );
    }

    #[test]
    fn print_definition_alone() {
        let file = parse("|Flag\n  On\n  Off").unwrap();
        assert_eq!(print_definition(&file.definitions[0]), "|Flag\n  On\n  Off\n");
    }

    #[test]
    fn print_empty_file() {
        assert_eq!(reprint(""), "");
    }
}
