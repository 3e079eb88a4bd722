//! Grammar productions, one module per nonterminal family. Every function
//! here takes the token cursor where it found it and leaves it just past
//! whatever it consumed — including on the error paths, where it leaves
//! an `ERROR` marker behind instead of panicking or returning a `Result`.

mod embed;
mod keyword;
mod list;
mod literal;
mod object;
mod string;
mod value;

use crate::diagnostics::MessageKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;

/// `kson → (object_internals | value) EOF`
pub fn kson(p: &mut Parser) {
    if object::starts_keyword(p) || p.eof() {
        object::object_internals(p);
    } else {
        value::value(p);
    }
    if !p.eof() {
        let m = p.mark();
        while !p.eof() {
            p.bump();
        }
        p.error_marker(m, MessageKind::EofNotReached);
    }
}

/// Scan past a multi-token string (without consuming it) to see whether a
/// `:` immediately follows — the lookahead `object_internals` needs to
/// tell a top-level keyed document from a bare string value.
fn looks_ahead_past_string_for_colon(p: &Parser) -> bool {
    let mut n = 1;
    loop {
        match p.look_ahead(n) {
            TokenKind::StringCloseQuote => return p.look_ahead(n + 1) == TokenKind::Colon,
            TokenKind::Eof => return false,
            _ => n += 1,
        }
    }
}

fn is_value_start(p: &Parser) -> bool {
    matches!(
        p.kind(),
        TokenKind::LCurly
            | TokenKind::Identifier
            | TokenKind::LSquare
            | TokenKind::EmbedOpenDelim
            | TokenKind::StringOpenQuote
            | TokenKind::Number
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
    )
}
