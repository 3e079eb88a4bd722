use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::marker::ParsedKind;
use crate::parser::Parser;

use super::{is_value_start, value};

/// `list → dash_list | bracket_list`
pub(super) fn list(p: &mut Parser) {
    if p.at(TokenKind::ListDash) {
        dash_list(p);
    } else {
        bracket_list(p);
    }
}

/// `dash_list → ( LIST_DASH ( value | bracket_list ) )*`
///
/// A dash_list is not directly nestable in a dash_list — `- -` is flagged
/// rather than read as a nested list, to avoid the ambiguity with an empty
/// element followed by a new one.
fn dash_list(p: &mut Parser) {
    let m = p.mark();
    while p.at(TokenKind::ListDash) {
        let element = p.mark();
        p.bump(); // "-"
        if p.at(TokenKind::ListDash) {
            p.error_marker(element, MessageKind::NestedDashList);
            continue;
        }
        if p.at(TokenKind::LSquare) {
            bracket_list(p);
            p.done(element, ParsedKind::ListElement);
        } else if is_value_start(p) {
            value::value(p);
            p.done(element, ParsedKind::ListElement);
        } else {
            p.error_marker(element, MessageKind::DanglingListDash);
        }
    }
    p.done(m, ParsedKind::List);
}

/// `bracket_list → "[" ( value "," )* value? "]"`
fn bracket_list(p: &mut Parser) {
    let m = p.mark();
    p.bump(); // "["
    while !p.at(TokenKind::RSquare) && !p.eof() {
        let element = p.mark();
        value::value(p);
        p.done(element, ParsedKind::ListElement);
        if p.at(TokenKind::Comma) {
            p.bump();
        } else {
            break;
        }
    }
    if p.at(TokenKind::RSquare) {
        p.bump();
        p.done(m, ParsedKind::List);
    } else {
        p.error_marker(m, MessageKind::ListNoClose);
    }
}
