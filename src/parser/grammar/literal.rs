use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;

use super::string;

/// `literal → string | IDENTIFIER | NUMBER | TRUE | FALSE | NULL`
pub(super) fn literal(p: &mut Parser) {
    match p.kind() {
        TokenKind::StringOpenQuote => string::string(p),
        TokenKind::Identifier | TokenKind::Number | TokenKind::True | TokenKind::False | TokenKind::Null => {
            p.bump();
        }
        _ => {
            p.error_here(MessageKind::ExpectedValue {
                found: format!("{:?}", p.kind()),
            });
        }
    }
}
