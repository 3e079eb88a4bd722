//! A lexer, marker-based recursive-descent parser, and JSON-Schema-Draft-7
//! validator for KSON — a human-friendly superset of JSON that adds bare
//! identifier keys, comments, and embedded-language blocks.
//!
//! [`scanner`] produces a flat character-class token stream, [`lexer`]
//! groups that into lexical [`lexer::Token`]s, [`parser`] drives a
//! marker/[`marker::Builder`] based recursive descent over those tokens
//! into an untyped syntax tree, and [`ast`] lowers that tree into a typed
//! [`ast::AstNode`]. [`value`] flattens the AST further into
//! [`value::KsonValue`], the model [`schema`] validates and [`pointer`]
//! navigates. [`api`] is the only module most callers need.

pub mod api;
pub mod ast;
pub mod diagnostics;
pub mod kstr;
pub mod lexer;
pub mod limit;
pub mod location;
pub mod marker;
pub mod numeric;
pub mod parser;
pub mod pointer;
pub mod scanner;
pub mod schema;
pub mod value;

pub use api::{
    navigate_pointer, navigate_schema, parse, parse_schema, validate, validate_with_lookup, FormatOptions, ParseOptions, ParseOutcome,
    SchemaOutcome,
};
pub use ast::AstNode;
pub use diagnostics::{Message, MessageKind, MessageSink};
pub use pointer::JsonPointer;
pub use schema::{JsonSchema, SchemaIdLookup};
pub use value::KsonValue;
