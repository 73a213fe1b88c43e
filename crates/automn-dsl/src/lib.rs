//! # automn-dsl
//!
//! Lexer, parser and printer for the automn schema definition language.
//!
//! This crate provides:
//! - An indentation scanner that turns leading whitespace into
//!   `INDENT`/`DEDENT`/`NEWLINE` markers
//! - A logos-based tokenizer with contextual modes for paths and
//!   documentation text
//! - A recursive descent parser producing an [`automn_core::SourceFile`]
//! - A printer back to canonical DSL text and an S-expression tree dump
//!
//! # Example
//!
//! ```
//! use automn_dsl::{parse, print};
//!
//! let source = "\
//! User \"users\" &Timestamps
//!   name: String
//!   role: Admin, Member = Member
//!
//! |Status
//!   Active
//!   Inactive
//! ";
//!
//! let file = parse(source).expect("parse failed");
//! assert_eq!(file.definitions.len(), 2);
//! assert_eq!(file.models().next().unwrap().name.as_str(), "User");
//!
//! let text = print(&file);
//! assert!(text.contains("  role: Admin, Member = Member"));
//! ```

pub mod error;
mod lexer;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod sexp;
pub mod token;

pub use error::{describe_expected, DslError, ErrorKind, LineIndex, Location};
pub use lexer::{
    tokenize, tokenize_with_config, Lexer, LexerConfig, RecordedTokens, SpannedToken, TokenSource,
};
pub use parser::{parse, parse_tokens, parse_with_config, Parser};
pub use printer::{print, print_definition};
pub use sexp::{to_sexp, to_sexp_pretty};
pub use token::Token;
