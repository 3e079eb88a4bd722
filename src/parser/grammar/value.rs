use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;

use super::{embed, list, literal, object};

fn starts_object_definition(p: &Parser) -> bool {
    match p.kind() {
        TokenKind::LCurly => true,
        TokenKind::Identifier => p.look_ahead(1) == TokenKind::LCurly,
        _ => false,
    }
}

/// `value → object_definition | list | literal | embed_block`
pub(super) fn value(p: &mut Parser) {
    if p.enter_recursion() {
        p.error_here(MessageKind::RecursionLimitReached);
        p.exit_recursion();
        return;
    }

    if starts_object_definition(p) {
        object::object_definition(p);
    } else if matches!(p.kind(), TokenKind::ListDash | TokenKind::LSquare) {
        list::list(p);
    } else if p.kind() == TokenKind::EmbedOpenDelim {
        embed::embed_block(p);
    } else if matches!(
        p.kind(),
        TokenKind::StringOpenQuote
            | TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
    ) {
        literal::literal(p);
    } else {
        p.error_here(MessageKind::ExpectedValue {
            found: format!("{:?}", p.kind()),
        });
    }

    p.exit_recursion();
}
