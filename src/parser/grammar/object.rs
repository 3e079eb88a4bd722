use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::marker::ParsedKind;
use crate::parser::Parser;

use super::{keyword, looks_ahead_past_string_for_colon, value};

pub(super) fn starts_keyword(p: &Parser) -> bool {
    match p.kind() {
        TokenKind::Identifier => p.look_ahead(1) == TokenKind::Colon,
        TokenKind::StringOpenQuote => looks_ahead_past_string_for_colon(p),
        _ => false,
    }
}

/// `object_internals → ( keyword value ","? )*`
///
/// An optional trailing comma between properties is accepted; a missing
/// one is not an error.
pub(super) fn object_internals(p: &mut Parser) {
    let m = p.mark();
    while starts_keyword(p) {
        let prop = p.mark();
        keyword::keyword(p);
        value::value(p);
        if p.at(TokenKind::Comma) {
            p.bump();
        }
        p.done(prop, ParsedKind::ObjectProperty);
    }
    p.done(m, ParsedKind::ObjectInternals);
}

/// `object_def → ( IDENTIFIER? ) "{" object_internals "}"`
pub(super) fn object_definition(p: &mut Parser) {
    let m = p.mark();
    if p.at(TokenKind::Identifier) {
        p.bump();
    }
    if !p.at(TokenKind::LCurly) {
        p.error_marker(
            m,
            MessageKind::ExpectedValue {
                found: format!("{:?}", p.kind()),
            },
        );
        return;
    }
    p.bump();
    object_internals(p);
    if p.at(TokenKind::RCurly) {
        p.bump();
        p.done(m, ParsedKind::ObjectDefinition);
    } else {
        p.error_marker(m, MessageKind::ObjectNoClose);
    }
}
