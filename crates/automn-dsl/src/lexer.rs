use std::collections::VecDeque;

use automn_core::Span;
use logos::Logos;
use tracing::trace;

use crate::error::{DslError, LineIndex, Location};
use crate::scanner::{measure, IndentError, IndentScanner, Layout};
use crate::token::{Lexeme, PathLexeme, Token};

/// A token paired with its source span and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    /// Source text of the token. Empty for layout markers. For
    /// [`Token::Documentation`] inside a `>>` block this carries the
    /// indentation beyond the block's first line as leading spaces.
    pub text: String,
    pub location: Location,
}

/// Where the parser pulls its tokens from.
///
/// [`Lexer`] is the implementation used for source text; [`RecordedTokens`]
/// replays a token vector. After the last real token an implementation must
/// keep returning [`Token::End`].
pub trait TokenSource {
    fn next_token(&mut self) -> Result<SpannedToken, DslError>;
}

/// Settings that change how source text is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    /// Columns a tab character counts for when measuring indentation.
    pub tab_width: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self { tab_width: 4 }
    }
}

impl LexerConfig {
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    /// Directly after `!`, a path literal, or the `>` closing a placeholder.
    Path,
}

/// State of a raw `>>` documentation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocBlock {
    Inactive,
    /// A `>>` line ended; the next deeper line starts the block body.
    Armed { parent: usize },
    /// Lines at least `body` wide are documentation text.
    Active { parent: usize, body: usize },
}

/// Indentation-aware tokenizer over a source string.
///
/// Lines are measured and handed to the [`IndentScanner`]; the rest of each
/// line is tokenized with logos in the current mode.
pub struct Lexer<'src> {
    source: &'src str,
    lines: LineIndex<'src>,
    config: LexerConfig,
    scanner: IndentScanner,
    pending: VecDeque<SpannedToken>,
    pos: usize,
    at_line_start: bool,
    mode: Mode,
    /// Path placeholders opened and not yet closed on this line.
    placeholders: usize,
    doc_block: DocBlock,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_config(source, LexerConfig::default())
    }

    pub fn with_config(source: &'src str, config: LexerConfig) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            config,
            scanner: IndentScanner::new(),
            pending: VecDeque::new(),
            pos: 0,
            at_line_start: true,
            mode: Mode::Normal,
            placeholders: 0,
            doc_block: DocBlock::Inactive,
            finished: false,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    fn push(&mut self, token: Token, span: Span, text: impl Into<String>) {
        let location = self.lines.location(span.start);
        self.pending.push_back(SpannedToken {
            token,
            span,
            text: text.into(),
            location,
        });
    }

    fn push_layout(&mut self, token: Token, offset: usize) {
        trace!(token = %token, offset, "layout");
        self.push(token, Span::empty(offset), "");
    }

    fn end_token(&self) -> SpannedToken {
        let offset = self.source.len();
        SpannedToken {
            token: Token::End,
            span: Span::empty(offset),
            text: String::new(),
            location: self.lines.location(offset),
        }
    }

    fn finish(&mut self) {
        let offset = self.source.len();
        for _ in 0..self.scanner.finish() {
            self.push_layout(Token::Dedent, offset);
        }
        self.push_layout(Token::End, offset);
        self.finished = true;
    }

    /// Byte offset where the line containing `from` ends, excluding the break.
    fn line_end(&self, from: usize) -> usize {
        self.source[from..]
            .find(['\n', '\r'])
            .map_or(self.source.len(), |i| from + i)
    }

    fn dedent_error(&self, err: IndentError, offset: usize) -> DslError {
        DslError::InconsistentDedent {
            width: err.width,
            levels: err.levels,
            span: Span::empty(offset),
            location: self.lines.location(offset),
        }
    }

    /// Measures a new line and emits its layout markers.
    fn begin_line(&mut self) -> Result<(), DslError> {
        let (width, consumed) = measure(&self.source[self.pos..], self.config.tab_width);
        let content = self.pos + consumed;
        let rest = &self.source[content..];

        if rest.is_empty() {
            self.pos = content;
            self.finish();
            return Ok(());
        }
        if let Some(len) = line_break_len(rest) {
            self.pos = content + len;
            return Ok(());
        }

        self.pos = content;
        self.at_line_start = false;
        self.mode = Mode::Normal;
        self.placeholders = 0;

        if self.continue_doc_block(width, content)? {
            return Ok(());
        }

        let markers = self
            .scanner
            .line(width)
            .map_err(|err| self.dedent_error(err, content))?;
        for marker in markers {
            let token = match marker {
                Layout::Indent => Token::Indent,
                Layout::Dedent => Token::Dedent,
                Layout::Newline => Token::Newline,
            };
            self.push_layout(token, content);
        }

        self.line_head(content);
        Ok(())
    }

    /// Handles a line while a `>>` block is armed or active. Returns `true`
    /// when the line was consumed as documentation.
    fn continue_doc_block(&mut self, width: usize, content: usize) -> Result<bool, DslError> {
        match self.doc_block {
            DocBlock::Inactive => Ok(false),
            DocBlock::Armed { parent } => {
                if width <= parent {
                    self.doc_block = DocBlock::Inactive;
                    return Ok(false);
                }
                self.scanner
                    .line(width)
                    .map_err(|err| self.dedent_error(err, content))?;
                self.push_layout(Token::Indent, content);
                self.doc_block = DocBlock::Active {
                    parent,
                    body: width,
                };
                self.documentation_line(content, 0);
                Ok(true)
            }
            DocBlock::Active { parent, body } => {
                if width >= body {
                    self.push_layout(Token::Newline, content);
                    self.documentation_line(content, width - body);
                    Ok(true)
                } else if width > parent {
                    let levels = self.scanner.levels().to_vec();
                    Err(self.dedent_error(IndentError { width, levels }, content))
                } else {
                    self.doc_block = DocBlock::Inactive;
                    Ok(false)
                }
            }
        }
    }

    /// Emits the rest of the line as block documentation, re-indented by
    /// `extra` spaces.
    fn documentation_line(&mut self, content: usize, extra: usize) {
        let end = self.line_end(content);
        let text = self.source[content..end].trim_end();
        let span = Span::new(content, content + text.len());
        let text = format!("{}{text}", " ".repeat(extra));
        self.push(Token::Documentation, span, text);
        self.pos = end;
    }

    /// Recognizes `>` and `>>` at the start of a line's content.
    fn line_head(&mut self, content: usize) {
        let rest = &self.source[content..];
        if rest.starts_with(">>") {
            self.push(Token::DocBlockOpen, Span::new(content, content + 2), ">>");
            self.pos = content + 2;
            let end = self.line_end(self.pos);
            if self.source[self.pos..end].trim().is_empty() {
                self.doc_block = DocBlock::Armed {
                    parent: self.scanner.current(),
                };
            }
        } else if rest.starts_with('>') {
            self.push(Token::DocMarker, Span::new(content, content + 1), ">");
            let start = content + 1;
            let end = self.line_end(start);
            let raw = &self.source[start..end];
            let text = raw.trim();
            let offset = start + (raw.len() - raw.trim_start().len());
            self.push(
                Token::Documentation,
                Span::new(offset, offset + text.len()),
                text,
            );
            self.pos = end;
        }
    }

    fn lex_path(&mut self) {
        let mut lexer = PathLexeme::lexer(&self.source[self.pos..]);
        let base = self.pos;
        match lexer.next() {
            Some(Ok(PathLexeme::Literal)) => {
                let range = lexer.span();
                let span = Span::new(base + range.start, base + range.end);
                self.push(Token::PathLiteral, span, lexer.slice());
                self.pos = span.end;
            }
            Some(Ok(PathLexeme::OpenCaret)) => {
                let range = lexer.span();
                let span = Span::new(base + range.start, base + range.end);
                self.push(Token::PathOpenCaret, span, "<");
                self.pos = span.end;
                self.placeholders += 1;
                self.mode = Mode::Normal;
            }
            _ => self.mode = Mode::Normal,
        }
    }

    fn lex_normal(&mut self) -> Result<(), DslError> {
        let base = self.pos;
        let mut lexer = Lexeme::lexer(&self.source[base..]);
        let Some(result) = lexer.next() else {
            self.pos = self.source.len();
            self.at_line_start = true;
            return Ok(());
        };
        let range = lexer.span();
        let span = Span::new(base + range.start, base + range.end);

        let lexeme = match result {
            Ok(lexeme) => lexeme,
            // A continuation with nothing left to continue.
            Err(()) if &self.source[span.start..] == "\\" => {
                self.pos = self.source.len();
                return Ok(());
            }
            Err(()) => return Err(self.invalid_token(span.start)),
        };
        self.pos = span.end;

        let Some(token) = lexeme.token() else {
            self.at_line_start = true;
            return Ok(());
        };
        match token {
            Token::Bang => self.mode = Mode::Path,
            Token::CloseCaret if self.placeholders > 0 => {
                self.placeholders -= 1;
                self.mode = Mode::Path;
            }
            _ => {}
        }
        self.push(token, span, lexer.slice());
        Ok(())
    }

    /// Classifies text no lexical rule accepts.
    fn invalid_token(&self, offset: usize) -> DslError {
        let rest = &self.source[offset..];
        let location = self.lines.location(offset);
        if rest.starts_with('"') {
            return string_error(rest, offset, location);
        }
        let len = rest.chars().next().map_or(0, char::len_utf8);
        DslError::InvalidToken {
            text: rest[..len].to_string(),
            span: Span::new(offset, offset + len),
            location,
        }
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Result<SpannedToken, DslError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            if self.finished {
                return Ok(self.end_token());
            }
            if self.at_line_start {
                self.begin_line()?;
            } else if self.mode == Mode::Path {
                self.lex_path();
            } else {
                self.lex_normal()?;
            }
        }
    }
}

/// Replays a recorded token sequence, then returns `End` forever.
#[derive(Debug, Clone)]
pub struct RecordedTokens {
    tokens: VecDeque<SpannedToken>,
    end: SpannedToken,
}

impl RecordedTokens {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        let (offset, location) = tokens
            .last()
            .map_or((0, Location::default()), |t| (t.span.end, t.location));
        Self {
            tokens: tokens.into(),
            end: SpannedToken {
                token: Token::End,
                span: Span::empty(offset),
                text: String::new(),
                location,
            },
        }
    }
}

impl TokenSource for RecordedTokens {
    fn next_token(&mut self) -> Result<SpannedToken, DslError> {
        Ok(self.tokens.pop_front().unwrap_or_else(|| self.end.clone()))
    }
}

/// Tokenizes DSL source text, including layout markers, up to and
/// including the final [`Token::End`].
///
/// # Errors
///
/// Returns the first lexical error: an unmatched character, a malformed
/// string literal, or an inconsistent dedent.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, DslError> {
    tokenize_with_config(source, LexerConfig::default())
}

pub fn tokenize_with_config(
    source: &str,
    config: LexerConfig,
) -> Result<Vec<SpannedToken>, DslError> {
    let mut lexer = Lexer::with_config(source, config);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.token == Token::End;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn line_break_len(text: &str) -> Option<usize> {
    if text.starts_with("\r\n") {
        Some(2)
    } else if text.starts_with('\n') || text.starts_with('\r') {
        Some(1)
    } else {
        None
    }
}

/// Explains why a string literal starting at `offset` did not lex.
fn string_error(rest: &str, offset: usize, location: Location) -> DslError {
    let mut chars = rest.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => break,
            '\n' | '\r' => break,
            '\\' => {
                let Some(&(_, next)) = chars.peek() else {
                    break;
                };
                let well_formed = match next {
                    'x' => rest[i + 2..]
                        .chars()
                        .take(2)
                        .filter(char::is_ascii_hexdigit)
                        .count()
                        == 2,
                    'u' => {
                        let digits = &rest[i + 2..];
                        if let Some(braced) = digits.strip_prefix('{') {
                            let hex = braced
                                .chars()
                                .take_while(char::is_ascii_hexdigit)
                                .count();
                            hex > 0 && braced[hex..].starts_with('}')
                        } else {
                            digits.chars().take(4).filter(char::is_ascii_hexdigit).count() == 4
                        }
                    }
                    _ => true,
                };
                if !well_formed {
                    let escape: String = rest[i..].chars().take(3).collect();
                    return DslError::InvalidEscape {
                        escape,
                        span: Span::new(offset + i, offset + i + 2),
                        location,
                    };
                }
                chars.next();
            }
            _ => {}
        }
    }
    let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    DslError::UnterminatedString {
        span: Span::new(offset, offset + end),
        location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn single_model() {
        use Token::*;
        assert_eq!(
            kinds("User\n  name: String\n  age: Int\n"),
            vec![
                Ident, Indent, Ident, Colon, Ident, Newline, Ident, Colon, Ident, Dedent, End
            ]
        );
    }

    #[test]
    fn dedent_is_followed_by_newline() {
        use Token::*;
        assert_eq!(
            kinds("A\n  x\nB"),
            vec![Ident, Indent, Ident, Dedent, Newline, Ident, End]
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        use Token::*;
        assert_eq!(
            kinds("\n\nA\n\n   \n  x\n\t\n"),
            vec![Ident, Indent, Ident, Dedent, End]
        );
    }

    #[test]
    fn empty_input_is_just_end() {
        assert_eq!(kinds(""), vec![Token::End]);
        assert_eq!(kinds("  \n\t\n"), vec![Token::End]);
    }

    #[test]
    fn end_repeats() {
        let mut lexer = Lexer::new("A");
        assert_eq!(lexer.next_token().unwrap().token, Token::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().token, Token::End);
        }
    }

    #[test]
    fn indents_balance_dedents() {
        let source = "A\n  b\n    c\n      d\n  e\nF\n  g";
        let tokens = kinds(source);
        let indents = tokens.iter().filter(|t| **t == Token::Indent).count();
        let dedents = tokens.iter().filter(|t| **t == Token::Dedent).count();
        assert_eq!(indents, 4);
        assert_eq!(indents, dedents);
    }

    #[test]
    fn tabs_count_as_configured_width() {
        use Token::*;
        // A tab at width 4 matches four spaces; at width 2 it does not.
        let source = "A\n\tb\n    c";
        assert_eq!(
            kinds(source),
            vec![Ident, Indent, Ident, Newline, Ident, Dedent, End]
        );
        let narrow = tokenize_with_config(source, LexerConfig::default().with_tab_width(2))
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect::<Vec<_>>();
        assert_eq!(
            narrow,
            vec![Ident, Indent, Ident, Indent, Ident, Dedent, Dedent, End]
        );
    }

    #[test]
    fn crlf_line_endings() {
        use Token::*;
        assert_eq!(
            kinds("A\r\n  x\r\n  y\r\n"),
            vec![Ident, Indent, Ident, Newline, Ident, Dedent, End]
        );
    }

    #[test]
    fn inconsistent_dedent_reports_line() {
        let err = tokenize("A\n    b\n  c\n").unwrap_err();
        match err {
            DslError::InconsistentDedent {
                width,
                levels,
                location,
                ..
            } => {
                assert_eq!(width, 2);
                assert_eq!(levels, vec![0, 4]);
                assert_eq!(location, Location::new(3, 3));
            }
            other => panic!("expected InconsistentDedent, got {other:?}"),
        }
    }

    #[test]
    fn spans_and_locations() {
        let tokens = tokenize("User\n  name: String").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 4));
        assert_eq!(tokens[0].text, "User");
        assert_eq!(tokens[1].token, Token::Indent);
        assert_eq!(tokens[1].span, Span::empty(7));
        assert_eq!(tokens[2].location, Location::new(2, 3));
        assert_eq!(tokens[4].text, "String");
        assert_eq!(tokens[4].span, Span::new(13, 19));
    }

    #[test]
    fn path_mode() {
        use Token::*;
        let tokens = tokenize("route !/users/<id: Int ~ 5>/posts?x=1 next").unwrap();
        let summary: Vec<(Token, &str)> =
            tokens.iter().map(|t| (t.token, t.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Ident, "route"),
                (Bang, "!"),
                (PathLiteral, "/users/"),
                (PathOpenCaret, "<"),
                (Ident, "id"),
                (Colon, ":"),
                (Ident, "Int"),
                (Tilde, "~"),
                (Number, "5"),
                (CloseCaret, ">"),
                (PathLiteral, "/posts?x=1"),
                (Ident, "next"),
                (End, ""),
            ]
        );
    }

    #[test]
    fn path_must_be_immediate() {
        use Token::*;
        assert_eq!(kinds("a ! b"), vec![Ident, Bang, Ident, End]);
    }

    #[test]
    fn spaced_caret_after_path_is_not_a_placeholder() {
        use Token::*;
        let tokens = tokenize("r !/a <b>").unwrap();
        let summary: Vec<(Token, &str)> =
            tokens.iter().map(|t| (t.token, t.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (Ident, "r"),
                (Bang, "!"),
                (PathLiteral, "/a"),
                (OpenCaret, "<"),
                (Ident, "b"),
                (CloseCaret, ">"),
                (End, ""),
            ]
        );
    }

    #[test]
    fn backslash_continues_the_line() {
        use Token::*;
        assert_eq!(kinds("User \\\n  &Base"), vec![Ident, Ampersand, Ident, End]);
        assert_eq!(
            kinds("A\n  x: \\\r\n      Int\n  y: Int"),
            vec![
                Ident, Indent, Ident, Colon, Ident, Newline, Ident, Colon, Ident, Dedent, End
            ]
        );
        assert_eq!(kinds("A \\"), vec![Ident, End]);
    }

    #[test]
    fn backslash_inside_a_line_is_invalid() {
        let err = tokenize("A \\ B").unwrap_err();
        assert!(matches!(err, DslError::InvalidToken { ref text, .. } if text == "\\"), "{err:?}");
    }

    #[test]
    fn dynamic_field_carets_are_normal() {
        use Token::*;
        assert_eq!(
            kinds("<key: String>: Int"),
            vec![OpenCaret, Ident, Colon, Ident, CloseCaret, Colon, Ident, End]
        );
    }

    #[test]
    fn single_line_documentation() {
        let tokens = tokenize("A\n  >   The user's  name  \n  x").unwrap();
        assert_eq!(tokens[2].token, Token::DocMarker);
        assert_eq!(tokens[3].token, Token::Documentation);
        assert_eq!(tokens[3].text, "The user's  name");
        assert_eq!(tokens[4].token, Token::Newline);
    }

    #[test]
    fn documentation_is_not_tokenized() {
        use Token::*;
        assert_eq!(
            kinds("> \"unterminated $ {"),
            vec![DocMarker, Documentation, End]
        );
    }

    #[test]
    fn raw_documentation_block() {
        let source = "A\n  >>\n    first line\n      indented more\n    last: not a field\n  x";
        let tokens = tokenize(source).unwrap();
        let summary: Vec<(Token, &str)> =
            tokens.iter().map(|t| (t.token, t.text.as_str())).collect();
        use Token::*;
        assert_eq!(
            summary,
            vec![
                (Ident, "A"),
                (Indent, ""),
                (DocBlockOpen, ">>"),
                (Indent, ""),
                (Documentation, "first line"),
                (Newline, ""),
                (Documentation, "  indented more"),
                (Newline, ""),
                (Documentation, "last: not a field"),
                (Dedent, ""),
                (Newline, ""),
                (Ident, "x"),
                (Dedent, ""),
                (End, ""),
            ]
        );
    }

    #[test]
    fn doc_block_dedent_between_levels_fails() {
        let err = tokenize("A\n  >>\n      deep\n    shallower\n").unwrap_err();
        assert!(matches!(err, DslError::InconsistentDedent { width: 4, .. }));
    }

    #[test]
    fn invalid_character() {
        let err = tokenize("User $").unwrap_err();
        assert_eq!(
            err,
            DslError::InvalidToken {
                text: "$".into(),
                span: Span::new(5, 6),
                location: Location::new(1, 6),
            }
        );
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("A \"never closed\nB").unwrap_err();
        assert!(matches!(err, DslError::UnterminatedString { .. }), "{err:?}");
        assert_eq!(err.span(), Span::new(2, 15));
    }

    #[test]
    fn malformed_escape() {
        let err = tokenize(r#"A "bad \xZZ""#).unwrap_err();
        match err {
            DslError::InvalidEscape { escape, .. } => assert_eq!(escape, r"\xZ"),
            other => panic!("expected InvalidEscape, got {other:?}"),
        }
    }

    #[test]
    fn recorded_tokens_end_forever() {
        let tokens = tokenize("A").unwrap();
        let mut recorded = RecordedTokens::new(tokens[..1].to_vec());
        assert_eq!(recorded.next_token().unwrap().token, Token::Ident);
        assert_eq!(recorded.next_token().unwrap().token, Token::End);
        assert_eq!(recorded.next_token().unwrap().span, Span::empty(1));
    }
}
