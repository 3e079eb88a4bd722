use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;

/// `string → STRING_OPEN_QUOTE STRING STRING_CLOSE_QUOTE`
///
/// No `ParsedKind` wraps this — the open quote, interior pieces, and
/// close quote are bumped as flat sibling leaf markers; AST lowering
/// regroups them (see [`crate::ast`]).
pub(super) fn string(p: &mut Parser) {
    p.bump(); // STRING_OPEN_QUOTE
    loop {
        match p.kind() {
            TokenKind::String
            | TokenKind::StringEscape
            | TokenKind::StringUnicodeEscape
            | TokenKind::StringIllegalCtl => {
                p.bump();
            }
            TokenKind::StringCloseQuote => {
                p.bump();
                return;
            }
            _ => {
                p.error_here(MessageKind::UnclosedString);
                return;
            }
        }
    }
}
