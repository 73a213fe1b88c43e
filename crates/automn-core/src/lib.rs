//! # automn-core
//!
//! Syntax tree types for the automn schema definition language.
//!
//! Every node owns its children exclusively and carries the byte [`Span`] of
//! the source text it was parsed from. Trees are built once by the parser in
//! `automn-dsl` and are read-only afterwards; [`visit::Visitor`] provides a
//! depth-first traversal for code generators and documentation tools.

pub mod ast;
pub mod span;
pub mod visit;

pub use ast::*;
pub use span::Span;
pub use visit::Visitor;
