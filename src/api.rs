//! The crate's public surface: the handful of entry points an editor,
//! CLI, or schema-tooling collaborator actually calls. Everything else
//! (`scanner`, `lexer`, `marker`, `parser`, `ast`) is plumbing reached
//! only from here.

use crate::ast::AstNode;
use crate::diagnostics::MessageSink;
use crate::lexer::{self, Token};
use crate::limit::DEFAULT_RECURSION_LIMIT;
use crate::parser::Parser;
use crate::pointer::{self, JsonPointer};
use crate::schema::evaluator;
use crate::schema::navigator::{self, SchemaNode};
use crate::schema::JsonSchema;
use crate::value::KsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// When `true`, the token stream returned alongside the outcome
    /// (via [`tokenize`]) covers every byte of `source`, trivia
    /// included.
    pub gap_free: bool,
    pub recursion_limit: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { gap_free: false, recursion_limit: DEFAULT_RECURSION_LIMIT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOptions {
    Tabs,
    Spaces(u8),
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions::Spaces(2)
    }
}

/// The result of [`parse`]: a semantic `value` for schema validation and
/// pointer navigation, the raw `ast` for tooling that wants spans and
/// comments, and whatever diagnostics were collected along the way.
///
/// `ast` (and `value`) is `Some` exactly when `messages` is empty.
pub struct ParseOutcome {
    pub value: Option<KsonValue>,
    pub ast: Option<AstNode>,
    pub messages: MessageSink,
    pub tokens: Vec<Token>,
}

pub fn parse(source: &str, options: ParseOptions) -> ParseOutcome {
    let tokens = lexer::tokenize(source, options.gap_free);
    let parse_tokens = if options.gap_free {
        tokens.iter().filter(|t| !t.kind.is_trivia()).cloned().collect()
    } else {
        tokens.clone()
    };
    let (builder, messages) = Parser::with_recursion_limit(parse_tokens, options.recursion_limit).parse();
    let ast = if messages.has_errors() { None } else { crate::ast::lower(&builder) };
    let value = ast.as_ref().map(KsonValue::from_ast);
    ParseOutcome { value, ast, messages, tokens }
}

pub struct SchemaOutcome {
    pub schema: Option<JsonSchema>,
    /// Every `$id` found while compiling `schema`, plus its document
    /// root — pass this to [`validate_with_lookup`] so `$ref` (absolute
    /// or a local `#/...` fragment) resolves during evaluation.
    pub lookup: crate::schema::id_lookup::SchemaIdLookup,
    pub messages: MessageSink,
}

pub fn parse_schema(source: &str) -> SchemaOutcome {
    let (schema, lookup, messages) = crate::schema::parse_schema(source);
    SchemaOutcome { schema, lookup, messages }
}

pub fn validate(value: &KsonValue, schema: &JsonSchema) -> Vec<crate::diagnostics::Message> {
    evaluator::validate(value, schema, &crate::schema::id_lookup::SchemaIdLookup::new())
}

/// Like [`validate`], but resolves `$ref` against `lookup` instead of an
/// empty index — used when `schema` came from [`parse_schema`] and may
/// reference sibling definitions by `$id`.
pub fn validate_with_lookup(
    value: &KsonValue,
    schema: &JsonSchema,
    lookup: &crate::schema::id_lookup::SchemaIdLookup,
) -> Vec<crate::diagnostics::Message> {
    evaluator::validate(value, schema, lookup)
}

pub fn navigate_pointer<'v>(value: &'v KsonValue, pointer: &JsonPointer) -> Vec<&'v KsonValue> {
    pointer::navigate(value, pointer)
}

pub fn navigate_schema<'s>(
    schema: &'s JsonSchema,
    pointer: &JsonPointer,
    lookup: &'s crate::schema::id_lookup::SchemaIdLookup,
) -> Vec<SchemaNode<'s>> {
    navigator::navigate_schema(schema, pointer, lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scenario_a_has_no_messages_and_an_ast() {
        let outcome = parse("name: 'John'\nage: 30", ParseOptions::default());
        assert!(!outcome.messages.has_errors());
        assert!(outcome.ast.is_some());
        let object = outcome.value.unwrap();
        let object = object.as_object().unwrap();
        assert_eq!(object.get("name").and_then(KsonValue::as_str), Some("John"));
    }

    #[test]
    fn parse_with_errors_has_no_ast_or_value() {
        let outcome = parse("key: 'unterminated", ParseOptions::default());
        assert!(outcome.messages.has_errors());
        assert!(outcome.ast.is_none());
        assert!(outcome.value.is_none());
    }

    #[test]
    fn gap_free_tokens_cover_every_byte() {
        let source = "name: 'John' # trailing\nage: 30";
        let outcome = parse(source, ParseOptions { gap_free: true, ..ParseOptions::default() });
        let reassembled: String = outcome.tokens.iter().map(|t| t.text()).collect();
        assert_eq!(reassembled, source);
    }

    #[test]
    fn ref_with_sibling_ignores_the_sibling_keyword() {
        let schema_source =
            "definitions: {\n  S: { type: string }\n}\nproperties: {\n  x: { $ref: '#/definitions/S', minLength: 5 }\n}";
        let schema_outcome = parse_schema(schema_source);
        assert!(schema_outcome
            .messages
            .iter()
            .any(|m| matches!(m.kind, crate::diagnostics::MessageKind::SchemaRefIgnoredProperty { .. })));

        let value_outcome = parse("x: 'ab'", ParseOptions::default());
        let messages = validate_with_lookup(&value_outcome.value.unwrap(), &schema_outcome.schema.unwrap(), &schema_outcome.lookup);
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn glob_navigation_returns_every_matching_leaf() {
        let outcome = parse(
            "users: {\n  alice: { email: 'a@x' }\n  bob: { email: 'b@x' }\n  charlie: { email: 'c@x' }\n}",
            ParseOptions::default(),
        );
        let value = outcome.value.unwrap();
        let pointer = JsonPointer::parse_glob("/users/*/email").unwrap();
        let found = navigate_pointer(&value, &pointer);
        let mut emails: Vec<&str> = found.into_iter().filter_map(KsonValue::as_str).collect();
        emails.sort_unstable();
        assert_eq!(emails, vec!["a@x", "b@x", "c@x"]);
    }
}
