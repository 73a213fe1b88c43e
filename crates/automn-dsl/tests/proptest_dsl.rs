use automn_dsl::{parse, print, to_sexp, tokenize, Token};
use proptest::prelude::*;

/// Strategy for PascalCase definition names.
fn pascal_case_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,15}"
}

/// Strategy for snake_case field names, avoiding the value keywords.
fn snake_case_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_filter("not a keyword", |s| {
        !matches!(s.as_str(), "true" | "false" | "null")
    })
}

/// Strategy for a type expression, built from a handful of shapes.
fn type_expr() -> impl Strategy<Value = String> {
    let atomic = prop_oneof![
        Just("String".to_string()),
        Just("Int".to_string()),
        Just("Uuid".to_string()),
        Just("Decimal(10, 2)".to_string()),
        Just("Text(\"utf8\")".to_string()),
    ];
    atomic.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| format!("[{t}]")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} | {b}")),
            prop::collection::vec(pascal_case_name(), 2..4).prop_map(|v| v.join(", ")),
        ]
    })
}

/// Strategy for a value that may appear after `=` or `~`.
fn value() -> impl Strategy<Value = String> {
    let atomic = prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        "[a-zA-Z0-9 _.-]{0,12}".prop_map(|s| format!("\"{s}\"")),
        Just("true".to_string()),
        Just("null".to_string()),
        pascal_case_name(),
    ];
    atomic.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(|v| format!("[{}]", v.join(", "))),
            prop::collection::vec((snake_case_name(), inner), 0..3).prop_map(|entries| {
                let entries: Vec<String> =
                    entries.into_iter().map(|(k, v)| format!("{k}: {v}")).collect();
                format!("{{{}}}", entries.join(", "))
            }),
        ]
    })
}

/// Strategy for one field line, indented by `indent` spaces.
fn field_line(indent: usize) -> impl Strategy<Value = String> {
    (
        snake_case_name(),
        any::<bool>(),
        type_expr(),
        prop::option::of(value()),
    )
        .prop_map(move |(name, optional, ty, default)| {
            let marker = if optional { "?" } else { "" };
            let default = default.map(|d| format!(" = {d}")).unwrap_or_default();
            format!("{}{name}{marker}: {ty}{default}", " ".repeat(indent))
        })
}

proptest! {
    /// A model with well-formed fields always parses.
    #[test]
    fn generated_model_always_parses(
        name in pascal_case_name(),
        fields in prop::collection::vec(field_line(2), 1..6),
    ) {
        let source = format!("{name}\n{}\n", fields.join("\n"));
        let result = parse(&source);
        prop_assert!(result.is_ok(), "Failed to parse:\n{source}\n{:?}", result.as_ref().err());
        let file = result.unwrap();
        prop_assert_eq!(file.definitions.len(), 1);
        prop_assert_eq!(file.definitions[0].name().as_str(), name.as_str());
        prop_assert_eq!(file.models().next().unwrap().fields().count(), fields.len());
    }

    /// Enum variants with parameters and defaults always parse.
    #[test]
    fn generated_enum_always_parses(
        name in pascal_case_name(),
        variants in prop::collection::vec((pascal_case_name(), any::<u16>()), 1..6),
    ) {
        let body: Vec<String> = variants
            .iter()
            .map(|(variant, n)| format!("  {variant}(Int) = {n}"))
            .collect();
        let source = format!("|{name}: Int\n{}", body.join("\n"));
        let file = parse(&source);
        prop_assert!(file.is_ok(), "Failed to parse:\n{source}");
        prop_assert_eq!(file.unwrap().enums().next().unwrap().variants().count(), variants.len());
    }

    /// Lexing and parsing never panic on arbitrary input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,200}") {
        let _ = tokenize(&input);
        let _ = parse(&input);
    }

    /// Arbitrary indentation never panics and, when lexing succeeds,
    /// every INDENT is closed by a DEDENT.
    #[test]
    fn indentation_is_balanced(
        lines in prop::collection::vec((0usize..12, prop::sample::select(vec![' ', '\t']), snake_case_name()), 0..12),
    ) {
        let source: String = lines
            .iter()
            .map(|(width, ch, word)| format!("{}{word}\n", ch.to_string().repeat(*width)))
            .collect();
        if let Ok(tokens) = tokenize(&source) {
            let indents = tokens.iter().filter(|t| t.token == Token::Indent).count();
            let dedents = tokens.iter().filter(|t| t.token == Token::Dedent).count();
            prop_assert_eq!(indents, dedents, "unbalanced layout for:\n{}", source);
            prop_assert_eq!(tokens.last().map(|t| t.token), Some(Token::End));
        }
    }

    /// Printing a parsed model and parsing it again yields the same tree.
    #[test]
    fn print_then_parse_round_trip(
        name in pascal_case_name(),
        fields in prop::collection::vec(field_line(2), 1..5),
        example in value(),
    ) {
        let source = format!(
            "{name} \"table\"\n  > Docs\n  [tag]\n  meta :: {example}\n{}\n",
            fields.join("\n")
        );
        let first = parse(&source);
        prop_assert!(first.is_ok(), "Failed to parse:\n{source}");
        let first = first.unwrap();
        let printed = print(&first);
        let second = parse(&printed);
        prop_assert!(second.is_ok(), "Re-parse failed for:\n{printed}");
        prop_assert_eq!(to_sexp(&first), to_sexp(&second.unwrap()));
    }
}
