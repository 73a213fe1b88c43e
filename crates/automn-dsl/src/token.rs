use logos::Logos;

/// Tokens delivered to the parser.
///
/// Most kinds come straight from the lexical rules in [`Lexeme`]. The
/// layout markers (`Indent`, `Dedent`, `Newline`, `End`) are produced by the
/// indentation scanner, and the path and documentation kinds by the lexer's
/// contextual modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // -- Layout --
    Indent,
    Dedent,
    Newline,
    End,

    // -- Reserved words --
    True,
    False,
    Null,

    // -- Literals --
    Number,
    String,
    Ident,

    // -- Punctuation --
    Slash,
    Ampersand,
    Colon,
    DoubleColon,
    Question,
    Equals,
    Tilde,
    Arrow,
    Pipe,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    OpenCaret,
    CloseCaret,
    Bang,

    // -- Contextual --
    /// Text of a path value following `!`.
    PathLiteral,
    /// `<` directly after a path literal or `!`, opening a path placeholder.
    PathOpenCaret,
    /// `>` at the start of a line.
    DocMarker,
    /// `>>` at the start of a line.
    DocBlockOpen,
    /// Free text of a documentation line.
    Documentation,
}

impl Token {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::Newline => "NEWLINE",
            Self::End => "end of input",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Null => "'null'",
            Self::Number => "number",
            Self::String => "string literal",
            Self::Ident => "identifier",
            Self::Slash => "'/'",
            Self::Ampersand => "'&'",
            Self::Colon => "':'",
            Self::DoubleColon => "'::'",
            Self::Question => "'?'",
            Self::Equals => "'='",
            Self::Tilde => "'~'",
            Self::Arrow => "'->'",
            Self::Pipe => "'|'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::OpenCaret => "'<'",
            Self::CloseCaret => "'>'",
            Self::Bang => "'!'",
            Self::PathLiteral => "path literal",
            Self::PathOpenCaret => "path placeholder '<'",
            Self::DocMarker => "documentation marker '>'",
            Self::DocBlockOpen => "documentation block '>>'",
            Self::Documentation => "documentation text",
        }
    }

    /// Whether the source text of the token says more than its kind does.
    pub fn carries_text(&self) -> bool {
        matches!(
            self,
            Self::Number | Self::String | Self::Ident | Self::PathLiteral | Self::Documentation
        )
    }

    /// Layout markers occupy no source text.
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Indent | Self::Dedent | Self::Newline | Self::End)
    }

    /// Whether the token can begin an atomic value.
    pub fn starts_atomic_value(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Number
                | Self::True
                | Self::False
                | Self::Null
                | Self::Ident
                | Self::Bang
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Lexical rules for the body of a line.
///
/// Horizontal whitespace is skipped; line breaks are returned so the lexer
/// can hand the next line to the indentation scanner. A backslash directly
/// before a line break joins the two lines and is skipped as well.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\x0C]+")]
#[logos(skip r"\\(\r?\n|\r)")]
pub(crate) enum Lexeme {
    #[regex(r"\r?\n|\r")]
    LineBreak,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    /// A double-quoted string. Escapes are validated here and decoded by
    /// the parser.
    #[regex(r#""([^"\\\r\n]|\\([^xu0-7\r\n]|[0-7][0-7]?[0-7]?|x[0-9a-fA-F][0-9a-fA-F]|u[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F]|u\{[0-9a-fA-F]+\}|\r?\n))*""#)]
    String,

    /// Identifiers may contain dashes after the first character.
    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*")]
    Ident,

    #[token("/")]
    Slash,

    #[token("&")]
    Ampersand,

    #[token(":")]
    Colon,

    #[token("::")]
    DoubleColon,

    #[token("?")]
    Question,

    #[token("=")]
    Equals,

    #[token("~")]
    Tilde,

    #[token("->")]
    Arrow,

    #[token("|")]
    Pipe,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token("<")]
    OpenCaret,

    #[token(">")]
    CloseCaret,

    #[token("!")]
    Bang,
}

impl Lexeme {
    /// The parser-facing token, or `None` for a line break.
    pub(crate) fn token(self) -> Option<Token> {
        let token = match self {
            Self::LineBreak => return None,
            Self::True => Token::True,
            Self::False => Token::False,
            Self::Null => Token::Null,
            Self::Number => Token::Number,
            Self::String => Token::String,
            Self::Ident => Token::Ident,
            Self::Slash => Token::Slash,
            Self::Ampersand => Token::Ampersand,
            Self::Colon => Token::Colon,
            Self::DoubleColon => Token::DoubleColon,
            Self::Question => Token::Question,
            Self::Equals => Token::Equals,
            Self::Tilde => Token::Tilde,
            Self::Arrow => Token::Arrow,
            Self::Pipe => Token::Pipe,
            Self::LBracket => Token::LBracket,
            Self::RBracket => Token::RBracket,
            Self::LParen => Token::LParen,
            Self::RParen => Token::RParen,
            Self::LBrace => Token::LBrace,
            Self::RBrace => Token::RBrace,
            Self::Comma => Token::Comma,
            Self::OpenCaret => Token::OpenCaret,
            Self::CloseCaret => Token::CloseCaret,
            Self::Bang => Token::Bang,
        };
        Some(token)
    }
}

/// Lexical rules inside a path value. Nothing is skipped: a path ends at
/// the first character these rules do not accept.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(crate) enum PathLexeme {
    #[regex(r"[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+")]
    Literal,

    #[token("<")]
    OpenCaret,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Lexeme> {
        Lexeme::lexer(input).filter_map(Result::ok).collect()
    }

    #[test]
    fn reserved_words_beat_identifiers() {
        assert_eq!(
            lex("true false null truthy"),
            vec![Lexeme::True, Lexeme::False, Lexeme::Null, Lexeme::Ident]
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            lex("/ & : :: ? = ~ -> | [ ] ( ) { } , < > !"),
            vec![
                Lexeme::Slash,
                Lexeme::Ampersand,
                Lexeme::Colon,
                Lexeme::DoubleColon,
                Lexeme::Question,
                Lexeme::Equals,
                Lexeme::Tilde,
                Lexeme::Arrow,
                Lexeme::Pipe,
                Lexeme::LBracket,
                Lexeme::RBracket,
                Lexeme::LParen,
                Lexeme::RParen,
                Lexeme::LBrace,
                Lexeme::RBrace,
                Lexeme::Comma,
                Lexeme::OpenCaret,
                Lexeme::CloseCaret,
                Lexeme::Bang,
            ]
        );
    }

    #[test]
    fn numbers() {
        for text in ["0", "42", "-7", "3.25", "-0.5", "1e10", "2.5E-3"] {
            let mut lexer = Lexeme::lexer(text);
            assert_eq!(lexer.next(), Some(Ok(Lexeme::Number)), "{text}");
            assert_eq!(lexer.slice(), text);
            assert_eq!(lexer.next(), None);
        }
    }

    #[test]
    fn identifiers_allow_inner_dashes() {
        let mut lexer = Lexeme::lexer("created-at _private x1");
        assert_eq!(lexer.next(), Some(Ok(Lexeme::Ident)));
        assert_eq!(lexer.slice(), "created-at");
        assert_eq!(lexer.next(), Some(Ok(Lexeme::Ident)));
        assert_eq!(lexer.slice(), "_private");
        assert_eq!(lexer.next(), Some(Ok(Lexeme::Ident)));
        assert_eq!(lexer.slice(), "x1");
    }

    #[test]
    fn strings_with_escapes() {
        for text in [
            r#""plain""#,
            r#""quote \" inside""#,
            r#""tab\tnewline\n""#,
            r#""octal \101 \0""#,
            r#""hex \x41""#,
            r#""unicode é \u{1F600}""#,
            "\"continued \\\nline\"",
        ] {
            let mut lexer = Lexeme::lexer(text);
            assert_eq!(lexer.next(), Some(Ok(Lexeme::String)), "{text}");
            assert_eq!(lexer.slice(), text);
        }
    }

    #[test]
    fn string_does_not_span_lines() {
        let mut lexer = Lexeme::lexer("\"open\nx\"");
        assert!(matches!(lexer.next(), Some(Err(()))));
    }

    #[test]
    fn line_breaks() {
        assert_eq!(
            lex("a\nb\r\nc\rd"),
            vec![
                Lexeme::Ident,
                Lexeme::LineBreak,
                Lexeme::Ident,
                Lexeme::LineBreak,
                Lexeme::Ident,
                Lexeme::LineBreak,
                Lexeme::Ident,
            ]
        );
    }

    #[test]
    fn escaped_line_breaks_are_skipped() {
        assert_eq!(lex("a \\\nb\\\r\nc"), vec![Lexeme::Ident, Lexeme::Ident, Lexeme::Ident]);
    }

    #[test]
    fn path_literal_stops_at_whitespace_and_caret() {
        let mut lexer = PathLexeme::lexer("/users/<id>");
        assert_eq!(lexer.next(), Some(Ok(PathLexeme::Literal)));
        assert_eq!(lexer.slice(), "/users/");
        assert_eq!(lexer.next(), Some(Ok(PathLexeme::OpenCaret)));

        let mut lexer = PathLexeme::lexer("a?b=c&d x");
        assert_eq!(lexer.next(), Some(Ok(PathLexeme::Literal)));
        assert_eq!(lexer.slice(), "a?b=c&d");
    }

    #[test]
    fn description_is_human_readable() {
        assert_eq!(Token::Ident.description(), "identifier");
        assert_eq!(Token::DoubleColon.description(), "'::'");
        assert_eq!(Token::End.to_string(), "end of input");
        assert!(Token::Indent.is_layout());
        assert!(!Token::Colon.is_layout());
        assert!(Token::Bang.starts_atomic_value());
        assert!(!Token::LBrace.starts_atomic_value());
    }
}
