use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::marker::ParsedKind;
use crate::parser::Parser;

/// `embed_block → EMBED_OPEN_DELIM EMBED_TAG? EMBED_CONTENT? EMBED_CLOSE_DELIM`
pub(super) fn embed_block(p: &mut Parser) {
    let m = p.mark();
    p.bump(); // EMBED_OPEN_DELIM
    if p.at(TokenKind::EmbedTag) {
        p.bump();
    }
    if p.at(TokenKind::EmbedPreambleNewline) {
        p.bump();
    }
    if p.at(TokenKind::EmbedContent) {
        p.bump();
    }
    if p.at(TokenKind::EmbedCloseDelim) {
        p.bump();
        p.done(m, ParsedKind::EmbedBlock);
    } else {
        p.error_marker(m, MessageKind::UnclosedEmbed);
    }
}
