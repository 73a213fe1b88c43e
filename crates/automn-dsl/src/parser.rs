use std::collections::VecDeque;

use automn_core::{
    AssociatedModel, ContextType, Definition, Describer, DescriberKind, DocLine, DynamicField, Enum,
    EnumMember, Field, FieldMember, FieldName, Function, FunctionMember, Identifier, Mixin, Model,
    ModelMember, ObjectEntry, ObjectKey, PathDynamic, PathSegment, ReturnField, SourceFile, Span,
    TypeDeclaration, TypeExpr, TypeKind, Value, ValueKind, Variant, VariantMember,
};
use tracing::{debug, debug_span};

use crate::error::DslError;
use crate::lexer::{Lexer, LexerConfig, SpannedToken, TokenSource};
use crate::token::Token;

const ATOMIC_VALUE_START: [Token; 7] = [
    Token::String,
    Token::Number,
    Token::True,
    Token::False,
    Token::Null,
    Token::Ident,
    Token::Bang,
];

/// Optional parts shared by fields and return fields.
struct FieldTail {
    type_decl: Option<TypeDeclaration>,
    example: Option<Value>,
    default: Option<Value>,
    members: Vec<FieldMember>,
}

/// Recursive descent parser for the automn grammar.
///
/// Pulls tokens from a [`TokenSource`] on demand and looks at most three
/// tokens ahead. Every token kind tested since the last consumed token is
/// remembered, so a failure reports the full set of tokens that would have
/// been accepted.
pub struct Parser<S> {
    tokens: S,
    lookahead: VecDeque<SpannedToken>,
    expected: Vec<Token>,
    last_end: usize,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(tokens: S) -> Self {
        Self {
            tokens,
            lookahead: VecDeque::with_capacity(3),
            expected: Vec::new(),
            last_end: 0,
        }
    }

    // -- Cursor helpers --

    fn fill(&mut self, n: usize) -> Result<(), DslError> {
        while self.lookahead.len() <= n {
            let token = self.tokens.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&SpannedToken, DslError> {
        self.fill(0)?;
        Ok(&self.lookahead[0])
    }

    /// Kind of the token `n` positions ahead, without recording it as expected.
    fn nth(&mut self, n: usize) -> Result<Token, DslError> {
        self.fill(n)?;
        Ok(self.lookahead[n].token)
    }

    fn start(&mut self) -> Result<usize, DslError> {
        Ok(self.peek()?.span.start)
    }

    fn advance(&mut self) -> Result<SpannedToken, DslError> {
        let token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.tokens.next_token()?,
        };
        self.expected.clear();
        if !token.token.is_layout() {
            self.last_end = token.span.end;
        }
        Ok(token)
    }

    fn at(&mut self, token: Token) -> Result<bool, DslError> {
        if !self.expected.contains(&token) {
            self.expected.push(token);
        }
        Ok(self.nth(0)? == token)
    }

    fn eat(&mut self, token: Token) -> Result<Option<SpannedToken>, DslError> {
        if self.at(token)? {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    fn expect(&mut self, token: Token) -> Result<SpannedToken, DslError> {
        if self.at(token)? {
            self.advance()
        } else {
            Err(self.unexpected(&[]))
        }
    }

    fn expect_ident(&mut self) -> Result<Identifier, DslError> {
        let token = self.expect(Token::Ident)?;
        Ok(Identifier::new(token.text, token.span))
    }

    fn at_atomic_value(&mut self) -> Result<bool, DslError> {
        for token in ATOMIC_VALUE_START {
            if self.at(token)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn at_describer(&mut self) -> Result<bool, DslError> {
        for token in [Token::LBracket, Token::DocMarker, Token::DocBlockOpen] {
            if self.at(token)? {
                return Ok(true);
            }
        }
        Ok(self.nth(0)? == Token::Ident && self.nth(1)? == Token::DoubleColon)
    }

    /// Builds an error for the current token from everything tested since
    /// the last consumed token, plus `extra`.
    fn unexpected(&mut self, extra: &[Token]) -> DslError {
        let mut expected = std::mem::take(&mut self.expected);
        for token in extra {
            if !expected.contains(token) {
                expected.push(*token);
            }
        }
        let found = match self.peek() {
            Ok(found) => found,
            Err(err) => return err,
        };
        if found.token == Token::End {
            DslError::UnexpectedEndOfInput {
                expected,
                span: found.span,
                location: found.location,
            }
        } else {
            DslError::UnexpectedToken {
                expected,
                found: found.token,
                text: found.text.clone(),
                span: found.span,
                location: found.location,
            }
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    /// `INDENT member (NEWLINE member)* DEDENT`, or nothing when the next
    /// token is not an `INDENT`.
    fn parse_optional_block<T>(
        &mut self,
        member: fn(&mut Self) -> Result<T, DslError>,
    ) -> Result<Vec<T>, DslError> {
        if !self.at(Token::Indent)? {
            return Ok(Vec::new());
        }
        self.parse_block(member)
    }

    /// INDENT member (NEWLINE member)* DEDENT
    fn parse_block<T>(
        &mut self,
        member: fn(&mut Self) -> Result<T, DslError>,
    ) -> Result<Vec<T>, DslError> {
        self.expect(Token::Indent)?;
        let mut members = vec![member(self)?];
        loop {
            if self.eat(Token::Newline)?.is_some() {
                members.push(member(self)?);
            } else if self.eat(Token::Dedent)?.is_some() {
                return Ok(members);
            } else {
                return Err(self.unexpected(&[]));
            }
        }
    }

    // -- Definitions --

    /// source_file = (definition (NEWLINE definition)*)? END
    pub fn parse_source_file(&mut self) -> Result<SourceFile, DslError> {
        let mut definitions = Vec::new();
        if !self.at(Token::End)? {
            definitions.push(self.parse_definition()?);
            while self.eat(Token::Newline)?.is_some() {
                definitions.push(self.parse_definition()?);
            }
        }
        let end = self.expect(Token::End)?;
        Ok(SourceFile {
            definitions,
            span: Span::new(0, end.span.end),
        })
    }

    fn parse_definition(&mut self) -> Result<Definition, DslError> {
        if self.at(Token::Pipe)? {
            return Ok(Definition::Enum(self.parse_enum()?));
        }
        if self.at(Token::Ident)? {
            if self.nth(1)? == Token::LParen {
                return Ok(Definition::Function(self.parse_function()?));
            }
            return Ok(Definition::Model(self.parse_model()?));
        }
        Err(self.unexpected(&[]))
    }

    /// model = IDENT (atomic_value | "&" IDENT)* body?
    fn parse_model(&mut self) -> Result<Model, DslError> {
        let name = self.expect_ident()?;
        let start = name.span.start;
        let mut modifiers = Vec::new();
        let mut mixins = Vec::new();
        loop {
            if let Some(amp) = self.eat(Token::Ampersand)? {
                let mixin = self.expect_ident()?;
                mixins.push(Mixin {
                    span: amp.span.to(mixin.span),
                    name: mixin,
                });
            } else if self.at_atomic_value()? {
                modifiers.push(self.parse_atomic_value()?);
            } else {
                break;
            }
        }
        let members = self.parse_optional_block(Self::parse_model_member)?;
        Ok(Model {
            name,
            modifiers,
            mixins,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_model_member(&mut self) -> Result<ModelMember, DslError> {
        if self.at(Token::Slash)? {
            return Ok(ModelMember::Associated(self.parse_associated_model()?));
        }
        if self.at_describer()? {
            return Ok(ModelMember::Describer(self.parse_describer()?));
        }
        if self.at(Token::Ident)? {
            if self.nth(1)? == Token::LParen {
                return Ok(ModelMember::Method(self.parse_function()?));
            }
            return Ok(ModelMember::Field(self.parse_field()?));
        }
        if self.at(Token::OpenCaret)? {
            return Ok(ModelMember::Field(self.parse_field()?));
        }
        Err(self.unexpected(&[]))
    }

    /// associated = "/" IDENT atomic_value* body?
    fn parse_associated_model(&mut self) -> Result<AssociatedModel, DslError> {
        let slash = self.expect(Token::Slash)?;
        let name = self.expect_ident()?;
        let mut modifiers = Vec::new();
        while self.at_atomic_value()? {
            modifiers.push(self.parse_atomic_value()?);
        }
        let members = self.parse_optional_block(Self::parse_model_member)?;
        Ok(AssociatedModel {
            name,
            modifiers,
            members,
            span: self.span_from(slash.span.start),
        })
    }

    // -- Fields --

    /// field = (IDENT | dynamic_field) type_decl? ("~" value)? ("=" value)? body?
    fn parse_field(&mut self) -> Result<Field, DslError> {
        let start = self.start()?;
        let name = if self.at(Token::OpenCaret)? {
            FieldName::Dynamic(self.parse_dynamic_field()?)
        } else {
            FieldName::Static(self.expect_ident()?)
        };
        let tail = self.parse_field_tail()?;
        Ok(Field {
            name,
            type_decl: tail.type_decl,
            example: tail.example,
            default: tail.default,
            members: tail.members,
            span: self.span_from(start),
        })
    }

    fn parse_field_tail(&mut self) -> Result<FieldTail, DslError> {
        let type_decl = self.parse_optional_type_declaration()?;
        let example = self.parse_prefixed_value(Token::Tilde)?;
        let default = self.parse_prefixed_value(Token::Equals)?;
        let members = self.parse_optional_block(Self::parse_field_member)?;
        Ok(FieldTail {
            type_decl,
            example,
            default,
            members,
        })
    }

    /// dynamic_field = "<" IDENT type_decl? ">"
    fn parse_dynamic_field(&mut self) -> Result<DynamicField, DslError> {
        let open = self.expect(Token::OpenCaret)?;
        let name = self.expect_ident()?;
        let type_decl = self.parse_optional_type_declaration()?;
        self.expect(Token::CloseCaret)?;
        Ok(DynamicField {
            name,
            type_decl,
            span: self.span_from(open.span.start),
        })
    }

    fn parse_field_member(&mut self) -> Result<FieldMember, DslError> {
        if self.at_describer()? {
            return Ok(FieldMember::Describer(self.parse_describer()?));
        }
        if self.at(Token::Colon)? {
            // `: context : type` needs three tokens to tell apart from `: type`.
            if self.nth(1)? == Token::Ident && self.nth(2)? == Token::Colon {
                return Ok(FieldMember::Context(self.parse_context_type()?));
            }
            return Ok(FieldMember::Type(self.parse_type_declaration()?));
        }
        if self.at(Token::Question)? {
            return Ok(FieldMember::Type(self.parse_type_declaration()?));
        }
        if let Some(example) = self.parse_prefixed_value(Token::Tilde)? {
            return Ok(FieldMember::Example(example));
        }
        if let Some(default) = self.parse_prefixed_value(Token::Equals)? {
            return Ok(FieldMember::Default(default));
        }
        Err(self.unexpected(&[Token::Ident]))
    }

    fn parse_context_type(&mut self) -> Result<ContextType, DslError> {
        let colon = self.expect(Token::Colon)?;
        let context = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        Ok(ContextType {
            context,
            ty,
            span: self.span_from(colon.span.start),
        })
    }

    fn parse_prefixed_value(&mut self, prefix: Token) -> Result<Option<Value>, DslError> {
        if self.eat(prefix)?.is_some() {
            Ok(Some(self.parse_value()?))
        } else {
            Ok(None)
        }
    }

    // -- Functions --

    /// function = IDENT "(" ")" body?
    fn parse_function(&mut self) -> Result<Function, DslError> {
        let name = self.expect_ident()?;
        let start = name.span.start;
        self.expect(Token::LParen)?;
        self.expect(Token::RParen)?;
        let members = self.parse_optional_block(Self::parse_function_member)?;
        Ok(Function {
            name,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_function_member(&mut self) -> Result<FunctionMember, DslError> {
        if self.at(Token::Arrow)? {
            return Ok(FunctionMember::Return(self.parse_return_field()?));
        }
        if self.at_describer()? {
            return Ok(FunctionMember::Describer(self.parse_describer()?));
        }
        if self.at(Token::Ident)? || self.at(Token::OpenCaret)? {
            return Ok(FunctionMember::Field(self.parse_field()?));
        }
        Err(self.unexpected(&[]))
    }

    fn parse_return_field(&mut self) -> Result<ReturnField, DslError> {
        let arrow = self.expect(Token::Arrow)?;
        let name = self.expect_ident()?;
        let tail = self.parse_field_tail()?;
        Ok(ReturnField {
            name,
            type_decl: tail.type_decl,
            example: tail.example,
            default: tail.default,
            members: tail.members,
            span: self.span_from(arrow.span.start),
        })
    }

    // -- Enums --

    /// enum = "|" IDENT type_decl? body?
    fn parse_enum(&mut self) -> Result<Enum, DslError> {
        let pipe = self.expect(Token::Pipe)?;
        let name = self.expect_ident()?;
        let type_decl = self.parse_optional_type_declaration()?;
        let members = self.parse_optional_block(Self::parse_enum_member)?;
        Ok(Enum {
            name,
            type_decl,
            members,
            span: self.span_from(pipe.span.start),
        })
    }

    fn parse_enum_member(&mut self) -> Result<EnumMember, DslError> {
        if self.at_describer()? {
            return Ok(EnumMember::Describer(self.parse_describer()?));
        }
        if self.at(Token::Ident)? {
            return Ok(EnumMember::Variant(self.parse_variant()?));
        }
        Err(self.unexpected(&[]))
    }

    /// variant = IDENT ("(" non_enum_type ("," non_enum_type)* ")")? ("=" value)? body?
    fn parse_variant(&mut self) -> Result<Variant, DslError> {
        let name = self.expect_ident()?;
        let start = name.span.start;
        let mut parameters = Vec::new();
        if self.eat(Token::LParen)?.is_some() {
            parameters.push(self.parse_non_enum_type()?);
            while self.eat(Token::Comma)?.is_some() {
                parameters.push(self.parse_non_enum_type()?);
            }
            self.expect(Token::RParen)?;
        }
        let default = self.parse_prefixed_value(Token::Equals)?;
        let members = self.parse_optional_block(Self::parse_variant_member)?;
        Ok(Variant {
            name,
            parameters,
            default,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_variant_member(&mut self) -> Result<VariantMember, DslError> {
        if self.at_describer()? {
            return Ok(VariantMember::Describer(self.parse_describer()?));
        }
        if let Some(default) = self.parse_prefixed_value(Token::Equals)? {
            return Ok(VariantMember::Default(default));
        }
        Err(self.unexpected(&[Token::Ident]))
    }

    // -- Describers --

    fn parse_describer(&mut self) -> Result<Describer, DslError> {
        let start = self.start()?;
        let kind = if self.eat(Token::LBracket)?.is_some() {
            let mut tags = Vec::new();
            if self.at(Token::Ident)? {
                tags.push(self.expect_ident()?);
                while self.eat(Token::Comma)?.is_some() {
                    tags.push(self.expect_ident()?);
                }
            }
            self.expect(Token::RBracket)?;
            DescriberKind::Tags(tags)
        } else if self.eat(Token::DocMarker)?.is_some() {
            DescriberKind::Doc(self.expect(Token::Documentation)?.text)
        } else if self.eat(Token::DocBlockOpen)?.is_some() {
            let lines = self.parse_block(|parser: &mut Self| -> Result<DocLine, DslError> {
                let line = parser.expect(Token::Documentation)?;
                Ok(DocLine::new(line.text, line.span))
            })?;
            DescriberKind::DocBlock(lines)
        } else {
            let key = self.expect_ident()?;
            self.expect(Token::DoubleColon)?;
            let value = self.parse_value()?;
            DescriberKind::Property { key, value }
        };
        Ok(Describer::new(kind, self.span_from(start)))
    }

    // -- Types --

    fn parse_optional_type_declaration(&mut self) -> Result<Option<TypeDeclaration>, DslError> {
        if self.at(Token::Colon)? || self.at(Token::Question)? {
            Ok(Some(self.parse_type_declaration()?))
        } else {
            Ok(None)
        }
    }

    /// type_decl = (":" | "?" ":"?) type
    fn parse_type_declaration(&mut self) -> Result<TypeDeclaration, DslError> {
        let start = self.start()?;
        let optional = if self.eat(Token::Question)?.is_some() {
            self.eat(Token::Colon)?;
            true
        } else {
            self.expect(Token::Colon)?;
            false
        };
        let ty = self.parse_type()?;
        Ok(TypeDeclaration {
            optional,
            ty,
            span: self.span_from(start),
        })
    }

    /// type = non_union ("|" non_union)*
    fn parse_type(&mut self) -> Result<TypeExpr, DslError> {
        self.parse_union(Self::parse_non_union_type)
    }

    /// Like [`Self::parse_type`], but inline enums are not allowed.
    fn parse_non_enum_type(&mut self) -> Result<TypeExpr, DslError> {
        self.parse_union(Self::parse_non_enum_term)
    }

    fn parse_union(
        &mut self,
        term: fn(&mut Self) -> Result<TypeExpr, DslError>,
    ) -> Result<TypeExpr, DslError> {
        let first = term(self)?;
        if !self.at(Token::Pipe)? {
            return Ok(first);
        }
        let start = first.span.start;
        let mut members = vec![first];
        while self.eat(Token::Pipe)?.is_some() {
            members.push(term(self)?);
        }
        Ok(TypeExpr::new(TypeKind::Union(members), self.span_from(start)))
    }

    /// non_union = "[" type "]" | IDENT ("," IDENT)+ | atomic_type
    ///
    /// An identifier followed by a comma starts an inline enum, which binds
    /// tighter than `|`.
    fn parse_non_union_type(&mut self) -> Result<TypeExpr, DslError> {
        if let Some(open) = self.eat(Token::LBracket)? {
            let element = self.parse_type()?;
            self.expect(Token::RBracket)?;
            return Ok(TypeExpr::new(
                TypeKind::Array(Box::new(element)),
                self.span_from(open.span.start),
            ));
        }
        if self.at(Token::Ident)? {
            if self.nth(1)? == Token::Comma {
                return self.parse_inline_enum();
            }
            return self.parse_atomic_type();
        }
        Err(self.unexpected(&[]))
    }

    fn parse_non_enum_term(&mut self) -> Result<TypeExpr, DslError> {
        if let Some(open) = self.eat(Token::LBracket)? {
            let element = self.parse_non_enum_type()?;
            self.expect(Token::RBracket)?;
            return Ok(TypeExpr::new(
                TypeKind::Array(Box::new(element)),
                self.span_from(open.span.start),
            ));
        }
        if self.at(Token::Ident)? {
            return self.parse_atomic_type();
        }
        Err(self.unexpected(&[]))
    }

    fn parse_inline_enum(&mut self) -> Result<TypeExpr, DslError> {
        let first = self.expect_ident()?;
        let start = first.span.start;
        let mut variants = vec![first];
        while self.eat(Token::Comma)?.is_some() {
            variants.push(self.expect_ident()?);
        }
        Ok(TypeExpr::new(
            TypeKind::InlineEnum(variants),
            self.span_from(start),
        ))
    }

    /// atomic_type = IDENT ("(" atomic_value ("," atomic_value)* ")")?
    fn parse_atomic_type(&mut self) -> Result<TypeExpr, DslError> {
        let name = self.expect_ident()?;
        let start = name.span.start;
        let mut arguments = Vec::new();
        if self.eat(Token::LParen)?.is_some() {
            arguments.push(self.parse_atomic_value()?);
            while self.eat(Token::Comma)?.is_some() {
                arguments.push(self.parse_atomic_value()?);
            }
            self.expect(Token::RParen)?;
        }
        Ok(TypeExpr::new(
            TypeKind::Atomic { name, arguments },
            self.span_from(start),
        ))
    }

    // -- Values --

    fn parse_value(&mut self) -> Result<Value, DslError> {
        if let Some(open) = self.eat(Token::LBrace)? {
            let mut entries = Vec::new();
            if !self.at(Token::RBrace)? {
                entries.push(self.parse_object_entry()?);
                while self.eat(Token::Comma)?.is_some() {
                    entries.push(self.parse_object_entry()?);
                }
            }
            self.expect(Token::RBrace)?;
            return Ok(Value::new(
                ValueKind::Object(entries),
                self.span_from(open.span.start),
            ));
        }
        if let Some(open) = self.eat(Token::LBracket)? {
            let mut items = Vec::new();
            if !self.at(Token::RBracket)? {
                items.push(self.parse_value()?);
                while self.eat(Token::Comma)?.is_some() {
                    items.push(self.parse_value()?);
                }
            }
            self.expect(Token::RBracket)?;
            return Ok(Value::new(
                ValueKind::Array(items),
                self.span_from(open.span.start),
            ));
        }
        self.parse_atomic_value()
    }

    fn parse_object_entry(&mut self) -> Result<ObjectEntry, DslError> {
        let start = self.start()?;
        let key = if let Some(token) = self.eat(Token::String)? {
            ObjectKey::String {
                text: unquote_string(&token)?,
                span: token.span,
            }
        } else {
            ObjectKey::Symbol(self.expect_ident()?)
        };
        self.expect(Token::Colon)?;
        let value = self.parse_value()?;
        Ok(ObjectEntry {
            key,
            value,
            span: self.span_from(start),
        })
    }

    /// atomic_value = STRING | NUMBER | true | false | null | IDENT | path
    fn parse_atomic_value(&mut self) -> Result<Value, DslError> {
        if self.at(Token::Bang)? {
            return self.parse_path();
        }
        if !self.at_atomic_value()? {
            return Err(self.unexpected(&[]));
        }
        let token = self.advance()?;
        let kind = match token.token {
            Token::String => ValueKind::String(unquote_string(&token)?),
            Token::Number => ValueKind::Number(token.text),
            Token::True => ValueKind::Bool(true),
            Token::False => ValueKind::Bool(false),
            Token::Null => ValueKind::Null,
            _ => ValueKind::Symbol(token.text),
        };
        Ok(Value::new(kind, token.span))
    }

    /// path = "!" (PATH_LITERAL | PATH_OPEN_CARET IDENT type_decl? ("~" value)? ">")+
    fn parse_path(&mut self) -> Result<Value, DslError> {
        let bang = self.expect(Token::Bang)?;
        let mut segments = Vec::new();
        loop {
            if let Some(literal) = self.eat(Token::PathLiteral)? {
                segments.push(PathSegment::Literal {
                    text: literal.text,
                    span: literal.span,
                });
            } else if self.at(Token::PathOpenCaret)? {
                segments.push(PathSegment::Dynamic(self.parse_path_dynamic()?));
            } else {
                break;
            }
        }
        if segments.is_empty() {
            return Err(self.unexpected(&[]));
        }
        Ok(Value::new(
            ValueKind::Path(segments),
            self.span_from(bang.span.start),
        ))
    }

    fn parse_path_dynamic(&mut self) -> Result<PathDynamic, DslError> {
        let open = self.expect(Token::PathOpenCaret)?;
        let name = self.expect_ident()?;
        let type_decl = self.parse_optional_type_declaration()?;
        let example = self.parse_prefixed_value(Token::Tilde)?;
        self.expect(Token::CloseCaret)?;
        Ok(PathDynamic {
            name,
            type_decl,
            example,
            span: self.span_from(open.span.start),
        })
    }
}

/// Decodes the escapes of a string literal token.
///
/// Supports single-character escapes, 1-3 digit octal, `\xHH`, `\uHHHH`,
/// `\u{H..}` and backslash line continuations. Unknown single-character
/// escapes stand for the character itself.
fn unquote_string(token: &SpannedToken) -> Result<String, DslError> {
    let text = token.text.as_str();
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);
    let invalid = |escape: &str| DslError::InvalidEscape {
        escape: escape.to_string(),
        span: token.span,
        location: token.location,
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(invalid("\\"));
        };
        let (digits, radix, end) = match escape {
            'n' => {
                out.push('\n');
                continue;
            }
            't' => {
                out.push('\t');
                continue;
            }
            'r' => {
                out.push('\r');
                continue;
            }
            'b' => {
                out.push('\u{8}');
                continue;
            }
            'f' => {
                out.push('\u{c}');
                continue;
            }
            'v' => {
                out.push('\u{b}');
                continue;
            }
            '\n' => continue,
            '\r' => {
                if chars.peek().is_some_and(|&(_, next)| next == '\n') {
                    chars.next();
                }
                continue;
            }
            '0'..='7' => {
                let len = inner[start + 1..]
                    .bytes()
                    .take(3)
                    .take_while(|b| (b'0'..=b'7').contains(b))
                    .count();
                (inner.get(start + 1..start + 1 + len), 8, start + 1 + len)
            }
            'x' => (inner.get(start + 2..start + 4), 16, start + 4),
            'u' if inner[start + 2..].starts_with('{') => {
                match inner[start + 3..].find('}') {
                    Some(close) => (
                        inner.get(start + 3..start + 3 + close),
                        16,
                        start + 4 + close,
                    ),
                    None => return Err(invalid(&inner[start..])),
                }
            }
            'u' => (inner.get(start + 2..start + 6), 16, start + 6),
            other => {
                out.push(other);
                continue;
            }
        };

        let code = digits
            .filter(|d| !d.is_empty())
            .and_then(|d| u32::from_str_radix(d, radix).ok())
            .and_then(char::from_u32);
        let escape_text = inner.get(start..end).unwrap_or(&inner[start..]);
        match code {
            Some(decoded) => out.push(decoded),
            None => return Err(invalid(escape_text)),
        }
        while chars.peek().is_some_and(|&(i, _)| i < end) {
            chars.next();
        }
    }
    Ok(out)
}

/// Parses DSL source text into a syntax tree.
///
/// # Errors
///
/// Returns the first lexical or syntax error; no partial tree is produced.
pub fn parse(source: &str) -> Result<SourceFile, DslError> {
    parse_with_config(source, LexerConfig::default())
}

pub fn parse_with_config(source: &str, config: LexerConfig) -> Result<SourceFile, DslError> {
    let _span = debug_span!("parse", bytes = source.len(), tab_width = config.tab_width).entered();
    parse_tokens(Lexer::with_config(source, config))
}

/// Parses a token stream from any [`TokenSource`].
pub fn parse_tokens<S: TokenSource>(tokens: S) -> Result<SourceFile, DslError> {
    let result = Parser::new(tokens).parse_source_file();
    match &result {
        Ok(file) => debug!(definitions = file.definitions.len(), "parsed source file"),
        Err(err) => debug!(kind = %err.kind(), error = %err, "parse failed"),
    }
    result
}
