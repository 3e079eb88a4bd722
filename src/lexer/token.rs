//! Token kinds and the token type itself.

use crate::kstr::KStr;
use crate::location::Location;

/// The closed set of lexical categories. Unlike [`crate::marker::ParsedKind`],
/// which labels a *range* of tokens, a `TokenKind` labels a single lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // structural
    LCurly,
    RCurly,
    LSquare,
    RSquare,
    LAngle,
    RAngle,
    Colon,
    Comma,
    ListDash,

    // comment/whitespace
    Comment,
    Whitespace,

    // string pieces
    StringOpenQuote,
    String,
    StringCloseQuote,
    StringEscape,
    StringUnicodeEscape,
    StringIllegalCtl,

    // embed pieces
    EmbedOpenDelim,
    EmbedCloseDelim,
    EmbedDelimPartial,
    EmbedTag,
    EmbedContent,
    EmbedPreambleNewline,

    // literals
    Number,
    Identifier,
    True,
    False,
    Null,

    IllegalChar,
    Eof,
}

impl TokenKind {
    /// `WHITESPACE` and `COMMENT` are the two kinds `tokenize(.., gap_free:
    /// false)` filters out.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// A single lexed token.
///
/// `value` is the semantically cleaned text — for most kinds it mirrors
/// `lexeme.text`, but for embed content it is the indent-stripped,
/// escape-rewritten body, and for string pieces the decoded fragment.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: crate::scanner::Lexeme,
    pub value: KStr,
    pub comments: Vec<KStr>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: crate::scanner::Lexeme) -> Self {
        let value = lexeme.text.clone();
        Self {
            kind,
            lexeme,
            value,
            comments: Vec::new(),
        }
    }

    pub fn with_value(kind: TokenKind, lexeme: crate::scanner::Lexeme, value: KStr) -> Self {
        Self {
            kind,
            lexeme,
            value,
            comments: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        self.lexeme.text.as_str()
    }

    pub fn location(&self) -> Location {
        self.lexeme.location
    }
}
