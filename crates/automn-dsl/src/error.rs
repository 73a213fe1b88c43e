use std::fmt;

use automn_core::Span;

use crate::token::Token;

/// A 1-based line/column position. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of a source text to [`Location`]s.
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        i += 1;
                    }
                    line_starts.push(i + 1);
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Location of `offset`; offsets past the end clamp to the end of input.
    pub fn location(&self, offset: usize) -> Location {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        Location::new(line + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Which stage of the pipeline rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The text could not be split into tokens or its indentation is malformed.
    Lexical,
    /// The tokens do not form a valid definition.
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("lexical error"),
            Self::Syntax => f.write_str("syntax error"),
        }
    }
}

/// Errors that occur while tokenizing or parsing DSL source.
///
/// Parsing stops at the first error; there is no recovery and no partial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DslError {
    /// No token rule matches the text at this position.
    InvalidToken {
        text: String,
        span: Span,
        location: Location,
    },

    /// A string literal is missing its closing quote before the end of the line.
    UnterminatedString { span: Span, location: Location },

    /// A string literal contains a malformed escape or one that names an
    /// invalid code point.
    InvalidEscape {
        escape: String,
        span: Span,
        location: Location,
    },

    /// A line is dedented to a width that no enclosing block was opened at.
    InconsistentDedent {
        width: usize,
        /// The indentation levels open when the line was reached.
        levels: Vec<usize>,
        span: Span,
        location: Location,
    },

    /// The parser found a token that cannot continue the current construct.
    UnexpectedToken {
        expected: Vec<Token>,
        found: Token,
        text: String,
        span: Span,
        location: Location,
    },

    /// The input ended while a construct was still open.
    UnexpectedEndOfInput {
        expected: Vec<Token>,
        span: Span,
        location: Location,
    },
}

impl DslError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidToken { .. }
            | Self::UnterminatedString { .. }
            | Self::InvalidEscape { .. }
            | Self::InconsistentDedent { .. } => ErrorKind::Lexical,
            Self::UnexpectedToken { .. } | Self::UnexpectedEndOfInput { .. } => {
                ErrorKind::Syntax
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::InvalidToken { span, .. }
            | Self::UnterminatedString { span, .. }
            | Self::InvalidEscape { span, .. }
            | Self::InconsistentDedent { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. } => *span,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Self::InvalidToken { location, .. }
            | Self::UnterminatedString { location, .. }
            | Self::InvalidEscape { location, .. }
            | Self::InconsistentDedent { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::UnexpectedEndOfInput { location, .. } => *location,
        }
    }

    /// The tokens that would have been accepted; empty for lexical errors.
    pub fn expected(&self) -> &[Token] {
        match self {
            Self::UnexpectedToken { expected, .. }
            | Self::UnexpectedEndOfInput { expected, .. } => expected,
            _ => &[],
        }
    }
}

/// Renders an expected-token set as `x`, `x or y`, or `one of x, y, z`.
pub fn describe_expected(expected: &[Token]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.description().to_string(),
        [first, second] => format!("{} or {}", first.description(), second.description()),
        many => {
            let names: Vec<&str> = many.iter().map(Token::description).collect();
            format!("one of {}", names.join(", "))
        }
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken { text, location, .. } => {
                write!(f, "invalid token '{}' at {location}", text.escape_debug())
            }
            Self::UnterminatedString { location, .. } => {
                write!(f, "unterminated string literal at {location}")
            }
            Self::InvalidEscape {
                escape, location, ..
            } => {
                write!(f, "invalid escape sequence '{escape}' at {location}")
            }
            Self::InconsistentDedent {
                width,
                levels,
                location,
                ..
            } => {
                let levels: Vec<String> = levels.iter().map(usize::to_string).collect();
                write!(
                    f,
                    "inconsistent dedent at {location}: width {width} does not match any enclosing indentation level ({})",
                    levels.join(", ")
                )
            }
            Self::UnexpectedToken {
                expected,
                found,
                text,
                location,
                ..
            } => {
                if found.carries_text() {
                    write!(
                        f,
                        "unexpected {found} '{text}' at {location}: expected {}",
                        describe_expected(expected)
                    )
                } else {
                    write!(
                        f,
                        "unexpected {found} at {location}: expected {}",
                        describe_expected(expected)
                    )
                }
            }
            Self::UnexpectedEndOfInput {
                expected, location, ..
            } => {
                write!(
                    f,
                    "unexpected end of input at {location}: expected {}",
                    describe_expected(expected)
                )
            }
        }
    }
}

impl std::error::Error for DslError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_locations() {
        let index = LineIndex::new("ab\ncd\r\nef\rgh");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.location(0), Location::new(1, 1));
        assert_eq!(index.location(1), Location::new(1, 2));
        assert_eq!(index.location(3), Location::new(2, 1));
        assert_eq!(index.location(7), Location::new(3, 1));
        assert_eq!(index.location(10), Location::new(4, 1));
        assert_eq!(index.location(99), Location::new(4, 3));
    }

    #[test]
    fn line_index_counts_characters() {
        let index = LineIndex::new("é: x");
        assert_eq!(index.location(2), Location::new(1, 2));
    }

    #[test]
    fn error_kinds() {
        let lexical = DslError::UnterminatedString {
            span: Span::new(0, 3),
            location: Location::default(),
        };
        assert_eq!(lexical.kind(), ErrorKind::Lexical);
        assert!(lexical.expected().is_empty());

        let syntax = DslError::UnexpectedEndOfInput {
            expected: vec![Token::Ident],
            span: Span::empty(4),
            location: Location::new(2, 1),
        };
        assert_eq!(syntax.kind(), ErrorKind::Syntax);
        assert_eq!(syntax.span(), Span::empty(4));
        assert_eq!(syntax.location(), Location::new(2, 1));
    }

    #[test]
    fn error_display_unexpected_token() {
        let err = DslError::UnexpectedToken {
            expected: vec![Token::Colon, Token::Newline, Token::Dedent],
            found: Token::Ident,
            text: "String".into(),
            span: Span::new(7, 13),
            location: Location::new(2, 8),
        };
        let msg = err.to_string();
        assert!(msg.contains("unexpected identifier 'String' at 2:8"), "{msg}");
        assert!(msg.contains("expected one of ':', NEWLINE, DEDENT"), "{msg}");
    }

    #[test]
    fn error_display_inconsistent_dedent() {
        let err = DslError::InconsistentDedent {
            width: 3,
            levels: vec![0, 2, 4],
            span: Span::empty(20),
            location: Location::new(4, 4),
        };
        let msg = err.to_string();
        assert!(msg.contains("inconsistent dedent at 4:4"));
        assert!(msg.contains("width 3"));
        assert!(msg.contains("(0, 2, 4)"));
    }

    #[test]
    fn expected_descriptions() {
        assert_eq!(describe_expected(&[Token::RParen]), "')'");
        assert_eq!(
            describe_expected(&[Token::Newline, Token::End]),
            "NEWLINE or end of input"
        );
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(DslError::InvalidToken {
            text: "$".into(),
            span: Span::new(0, 1),
            location: Location::default(),
        });
        assert!(err.to_string().contains("invalid token '$'"));
    }
}
