use automn_dsl::{describe_expected, DslError, Token};
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A diagnostic wrapping a `DslError` for rich miette rendering.
///
/// Carries the file contents so the report can show the offending line
/// with a label under the error span.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// Convert a `DslError` into a miette `SchemaDiagnostic`.
pub fn dsl_error_to_diagnostic(error: &DslError, source: &str, filename: &str) -> SchemaDiagnostic {
    let named_src = NamedSource::new(filename, source.to_string());
    let span = error.span();
    let span: SourceSpan = (span.start, span.end.saturating_sub(span.start)).into();

    let (label, suggestion) = match error {
        DslError::InvalidToken { text, .. } => (
            format!("'{}' is not part of the language", text.escape_debug()),
            Some("Check for typos or unsupported characters.".to_string()),
        ),

        DslError::UnterminatedString { .. } => (
            "string starts here".to_string(),
            Some("Close the string with '\"' before the end of the line, or end the line with '\\' to continue it.".to_string()),
        ),

        DslError::InvalidEscape { escape, .. } => (
            format!("'{escape}' is not a valid escape"),
            Some("Use \\n, \\t, \\xHH, \\uHHHH or \\u{...} with a valid code point.".to_string()),
        ),

        DslError::InconsistentDedent { width, levels, .. } => {
            let levels: Vec<String> = levels.iter().map(usize::to_string).collect();
            (
                format!("indented {width} columns"),
                Some(format!(
                    "Dedent to one of the enclosing levels: {}.",
                    levels.join(", ")
                )),
            )
        }

        DslError::UnexpectedToken {
            expected, found, ..
        } => (format!("unexpected {found}"), expected_help(expected)),

        DslError::UnexpectedEndOfInput { expected, .. } => {
            ("input ended here".to_string(), expected_help(expected))
        }

        // Catch future non_exhaustive variants
        _ => ("error".to_string(), None),
    };

    SchemaDiagnostic {
        src: named_src,
        span,
        message: error.to_string(),
        label,
        suggestion,
    }
}

fn expected_help(expected: &[Token]) -> Option<String> {
    if expected.is_empty() {
        return None;
    }
    let mut help = format!("expected {}", describe_expected(expected));
    if expected.contains(&Token::Indent) || expected.contains(&Token::Dedent) {
        help.push_str("; check the indentation of this line");
    }
    Some(help)
}

/// Render a parse error for a file as a miette report.
pub fn render_diagnostic(error: &DslError, source: &str, filename: &str) -> miette::Report {
    miette::Report::new(dsl_error_to_diagnostic(error, source, filename))
}
