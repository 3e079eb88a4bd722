//! The recursive-descent grammar over [`crate::marker::Builder`].
//!
//! `Parser` owns the builder and the diagnostic sink for one parse. It
//! never bails on the first error: grammar functions that hit something
//! unexpected emit an `ERROR` marker in place (via [`Parser::error_marker`])
//! and the caller decides how to recover — usually by continuing at the
//! next token rather than unwinding the whole parse.

pub(crate) mod grammar;

use crate::diagnostics::{Message, MessageKind, MessageSink};
use crate::lexer::{Token, TokenKind};
use crate::limit::{RecursionLimit, DEFAULT_RECURSION_LIMIT};
use crate::location::Location;
use crate::marker::{Builder, Marker, MarkerId, ParsedKind};

pub struct Parser {
    builder: Builder,
    pub sink: MessageSink,
    recursion_limit: RecursionLimit,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_recursion_limit(tokens, DEFAULT_RECURSION_LIMIT)
    }

    pub fn with_recursion_limit(tokens: Vec<Token>, limit: usize) -> Self {
        Self {
            builder: Builder::new(tokens),
            sink: MessageSink::new(),
            recursion_limit: RecursionLimit::new(limit),
        }
    }

    pub fn parse(mut self) -> (Builder, MessageSink) {
        grammar::kson(&mut self);
        self.builder.finish_root();
        (self.builder, self.sink)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.builder.token_kind() == kind
    }

    pub(crate) fn look_ahead(&self, n: usize) -> TokenKind {
        self.builder.look_ahead(n)
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.builder.token_kind()
    }

    pub(crate) fn text(&self) -> &str {
        self.builder.token_text()
    }

    pub(crate) fn eof(&self) -> bool {
        self.builder.eof()
    }

    pub(crate) fn mark(&mut self) -> Marker {
        self.builder.mark()
    }

    pub(crate) fn bump(&mut self) -> MarkerId {
        self.builder.bump()
    }

    pub(crate) fn advance(&mut self) {
        self.builder.advance();
    }

    pub(crate) fn current_location(&self) -> Location {
        self.builder.current_token().location()
    }

    /// Enter a recursive grammar production. Returns `true` if the limit
    /// has been exceeded; callers must still call [`Self::exit_recursion`]
    /// on every exit path, limited or not.
    pub(crate) fn enter_recursion(&mut self) -> bool {
        self.recursion_limit.check_and_increment()
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_limit.decrement();
    }

    /// Resolve `marker` as an `ERROR`, spanning from its first token to the
    /// current cursor position, and record the matching diagnostic.
    pub(crate) fn error_marker(&mut self, marker: Marker, kind: MessageKind) -> MarkerId {
        let first_idx = self.builder.node(marker.id()).first_token_index;
        let last_idx = self
            .builder
            .cursor()
            .saturating_sub(1)
            .max(first_idx)
            .min(self.builder.tokens().len() - 1);
        let location = Location::merge(
            self.builder.tokens()[first_idx].location(),
            self.builder.tokens()[last_idx].location(),
        );
        self.sink.error(location, kind.clone());
        marker.error(&mut self.builder, Message::new(location, kind))
    }

    /// A zero-width error at the current token, for conditions (missing
    /// key, missing value) that don't themselves consume anything.
    pub(crate) fn error_here(&mut self, kind: MessageKind) -> MarkerId {
        let marker = self.mark();
        self.error_marker(marker, kind)
    }

    pub(crate) fn done(&mut self, marker: Marker, kind: ParsedKind) -> MarkerId {
        marker.done(&mut self.builder, kind)
    }

    pub(crate) fn drop(&mut self, marker: Marker) {
        marker.drop(&mut self.builder)
    }

    pub(crate) fn rollback_to(&mut self, marker: Marker) {
        marker.rollback_to(&mut self.builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstNode;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> (crate::marker::Builder, MessageSink) {
        Parser::new(tokenize(source, false)).parse()
    }

    #[test]
    fn scenario_a_two_property_object() {
        let (builder, sink) = parse("name: 'John'\nage: 30");
        assert!(!sink.has_errors());
        let ast = crate::ast::lower(&builder).expect("no-error parse must lower");
        match ast {
            AstNode::KsonRoot { content: Some(content), .. } => match *content {
                AstNode::ObjectInternals { properties, .. } => {
                    assert_eq!(properties.len(), 2);
                    if let AstNode::ObjectProperty { key, comments, .. } = &properties[0] {
                        assert_eq!(key.as_str(), "name");
                        assert!(comments.is_empty());
                    } else {
                        panic!("expected an object property");
                    }
                }
                other => panic!("expected object internals, got {other:?}"),
            },
            other => panic!("expected content, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_an_error_and_skips_lowering() {
        let (builder, sink) = parse("key: 'unterminated");
        assert!(sink.has_errors());
        assert!(crate::ast::lower(&builder).is_none());
    }

    #[test]
    fn dangling_list_dash_reports_error() {
        let (_builder, sink) = parse("- 1\n-\n- 2");
        assert!(sink
            .iter()
            .any(|m| matches!(m.kind, MessageKind::DanglingListDash)));
    }

    #[test]
    fn nested_dash_is_flagged() {
        let (_builder, sink) = parse("- - 1");
        assert!(sink.iter().any(|m| matches!(m.kind, MessageKind::NestedDashList)));
    }

    #[test]
    fn trailing_content_after_document_is_flagged() {
        let (_builder, sink) = parse("1 2");
        assert!(sink.iter().any(|m| matches!(m.kind, MessageKind::EofNotReached)));
    }
}
