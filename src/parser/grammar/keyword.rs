use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::marker::ParsedKind;
use crate::parser::Parser;

use super::string;

/// `keyword → ( IDENTIFIER | string ) ":"`
pub(super) fn keyword(p: &mut Parser) {
    let m = p.mark();
    match p.kind() {
        TokenKind::Identifier => {
            p.bump();
        }
        TokenKind::StringOpenQuote => string::string(p),
        _ => {
            p.error_marker(
                m,
                MessageKind::ExpectedKey {
                    found: format!("{:?}", p.kind()),
                },
            );
            return;
        }
    }
    if p.at(TokenKind::Colon) {
        p.bump();
        p.done(m, ParsedKind::Keyword);
    } else {
        p.error_marker(
            m,
            MessageKind::ExpectedColon {
                found: format!("{:?}", p.kind()),
            },
        );
    }
}
