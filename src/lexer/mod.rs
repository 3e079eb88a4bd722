//! Tokenizer: turns a source string into a [`Token`] stream.
//!
//! The lexer never fails — unrecognized input becomes `ILLEGAL_CHAR` and
//! scanning continues. It also never touches a [`crate::diagnostics::MessageSink`];
//! anything that looks like an error here (an unterminated string, a dangling
//! embed delimiter) is only a *shape* in the token stream. The parser is the
//! one that turns that shape into a diagnostic, because by the time the
//! lexer sees it there is no enclosing context to blame.

pub mod token;

use crate::kstr::KStr;
use crate::scanner::Scanner;

pub use token::{Token, TokenKind};

/// Tokenize `source`. When `gap_free` is `true`, every byte of `source` is
/// covered by exactly one returned token (including `WHITESPACE` and
/// `COMMENT`); when `false`, those trivia tokens are dropped from the
/// returned list after lexing (they still drove comment attachment).
pub fn tokenize(source: &str, gap_free: bool) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    let mut pending_comments: Vec<KStr> = Vec::new();

    while !scanner.is_eof() {
        lex_one(&mut scanner, &mut tokens, &mut pending_comments);
    }

    let eof_lexeme = scanner.extract_lexeme();
    let mut eof = Token::new(TokenKind::Eof, eof_lexeme);
    eof.comments = std::mem::take(&mut pending_comments);
    tokens.push(eof);

    if !gap_free {
        tokens.retain(|t| !t.kind.is_trivia());
    }
    tokens
}

fn attach_pending(token: &mut Token, pending: &mut Vec<KStr>) {
    token.comments = std::mem::take(pending);
}

fn lex_one(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>) {
    let c = scanner.peek().expect("lex_one called at EOF");
    match c {
        c if c.is_whitespace() => lex_whitespace(scanner, tokens),
        '#' => lex_comment(scanner, tokens, pending),
        '{' => lex_single(scanner, tokens, pending, TokenKind::LCurly),
        '}' => lex_single(scanner, tokens, pending, TokenKind::RCurly),
        '[' => lex_single(scanner, tokens, pending, TokenKind::LSquare),
        ']' => lex_single(scanner, tokens, pending, TokenKind::RSquare),
        '<' => lex_single(scanner, tokens, pending, TokenKind::LAngle),
        '>' => lex_single(scanner, tokens, pending, TokenKind::RAngle),
        ':' => lex_single(scanner, tokens, pending, TokenKind::Colon),
        ',' => lex_single(scanner, tokens, pending, TokenKind::Comma),
        '"' | '\'' => lex_string(scanner, tokens, pending, c),
        '%' | '$' => lex_embed_or_partial(scanner, tokens, pending, c),
        '-' if matches!(scanner.peek_next(), None) || scanner.peek_next().unwrap().is_whitespace() => {
            lex_single(scanner, tokens, pending, TokenKind::ListDash)
        }
        '-' | '0'..='9' => lex_number(scanner, tokens, pending),
        c if is_ident_start(c) => lex_identifier(scanner, tokens, pending),
        _ => lex_single(scanner, tokens, pending, TokenKind::IllegalChar),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn lex_single(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>, kind: TokenKind) {
    scanner.advance();
    let lexeme = scanner.extract_lexeme();
    let mut token = Token::new(kind, lexeme);
    attach_pending(&mut token, pending);
    tokens.push(token);
}

fn lex_whitespace(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>) {
    while let Some(c) = scanner.peek() {
        if !c.is_whitespace() {
            break;
        }
        scanner.advance();
    }
    let lexeme = scanner.extract_lexeme();
    tokens.push(Token::new(TokenKind::Whitespace, lexeme));
}

fn lex_comment(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>) {
    while let Some(c) = scanner.peek() {
        if c == '\n' {
            break;
        }
        scanner.advance();
    }
    let lexeme = scanner.extract_lexeme();
    let body = lexeme.text.as_str().strip_prefix('#').unwrap_or(lexeme.text.as_str());
    pending.push(KStr::new(body.trim_start_matches(' ')));
    tokens.push(Token::new(TokenKind::Comment, lexeme));
}

fn lex_identifier(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>) {
    scanner.advance();
    while let Some(c) = scanner.peek() {
        if !is_ident_continue(c) {
            break;
        }
        scanner.advance();
    }
    let lexeme = scanner.extract_lexeme();
    let kind = match lexeme.text.as_str() {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        _ => TokenKind::Identifier,
    };
    let mut token = Token::new(kind, lexeme);
    attach_pending(&mut token, pending);
    tokens.push(token);
}

fn lex_number(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>) {
    scanner.advance();
    while let Some(c) = scanner.peek() {
        if !(c.is_alphanumeric() || c == '+' || c == '-' || c == '.') {
            break;
        }
        scanner.advance();
    }
    let lexeme = scanner.extract_lexeme();
    let mut token = Token::new(TokenKind::Number, lexeme);
    attach_pending(&mut token, pending);
    tokens.push(token);
}

fn is_illegal_string_ctl(c: char) -> bool {
    (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r')
}

fn lex_string(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>, quote: char) {
    scanner.advance();
    let open_lexeme = scanner.extract_lexeme();
    let mut open = Token::new(TokenKind::StringOpenQuote, open_lexeme);
    attach_pending(&mut open, pending);
    tokens.push(open);

    loop {
        match scanner.peek() {
            None => return,
            Some(c) if c == quote => {
                scanner.advance();
                let lexeme = scanner.extract_lexeme();
                tokens.push(Token::new(TokenKind::StringCloseQuote, lexeme));
                return;
            }
            Some('\\') => {
                scanner.advance();
                if scanner.peek() == Some('u') {
                    scanner.advance();
                    let mut consumed = 0;
                    while consumed < 4 {
                        match scanner.peek() {
                            Some(c) if c.is_ascii_hexdigit() => {
                                scanner.advance();
                                consumed += 1;
                            }
                            _ => break,
                        }
                    }
                    let lexeme = scanner.extract_lexeme();
                    let decoded = decode_unicode_escape(lexeme.text.as_str());
                    tokens.push(Token::with_value(TokenKind::StringUnicodeEscape, lexeme, decoded));
                } else {
                    if scanner.peek().is_some() {
                        scanner.advance();
                    }
                    let lexeme = scanner.extract_lexeme();
                    let decoded = decode_simple_escape(lexeme.text.as_str());
                    tokens.push(Token::with_value(TokenKind::StringEscape, lexeme, decoded));
                }
            }
            Some(c) if is_illegal_string_ctl(c) => {
                scanner.advance();
                let lexeme = scanner.extract_lexeme();
                tokens.push(Token::new(TokenKind::StringIllegalCtl, lexeme));
            }
            Some(_) => {
                while let Some(c) = scanner.peek() {
                    if c == quote || c == '\\' || is_illegal_string_ctl(c) {
                        break;
                    }
                    scanner.advance();
                }
                let lexeme = scanner.extract_lexeme();
                tokens.push(Token::new(TokenKind::String, lexeme));
            }
        }
    }
}

/// Maps a two-character escape (`\n`, `\t`, `\\`, `\'`, ...) to the
/// character it stands for. Falls back to the character after the
/// backslash verbatim for anything not in the known set.
fn decode_simple_escape(raw: &str) -> KStr {
    let escaped = raw.chars().nth(1);
    let decoded = match escaped {
        Some('n') => '\n',
        Some('t') => '\t',
        Some('r') => '\r',
        Some('0') => '\0',
        Some('\\') => '\\',
        Some('\'') => '\'',
        Some('"') => '"',
        Some('/') => '/',
        Some(other) => other,
        None => return KStr::new(""),
    };
    KStr::new(&decoded.to_string())
}

/// Decodes a `\uXXXX` escape into the `char` its hex digits name. A
/// surrogate-half or otherwise invalid code point decodes to the Unicode
/// replacement character rather than failing the lex.
fn decode_unicode_escape(raw: &str) -> KStr {
    let hex = &raw[2..];
    let code_point = u32::from_str_radix(hex, 16).unwrap_or(0xFFFD);
    let decoded = char::from_u32(code_point).unwrap_or('\u{FFFD}');
    KStr::new(&decoded.to_string())
}

/// `%` or `$` only opens an embed block when doubled; a lone occurrence is a
/// dangling partial delimiter.
fn lex_embed_or_partial(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>, delim: char) {
    if scanner.peek_next() == Some(delim) {
        lex_embed(scanner, tokens, pending, delim);
    } else {
        lex_single(scanner, tokens, pending, TokenKind::EmbedDelimPartial);
    }
}

fn lex_embed(scanner: &mut Scanner<'_>, tokens: &mut Vec<Token>, pending: &mut Vec<KStr>, delim: char) {
    scanner.advance();
    scanner.advance();
    let open_lexeme = scanner.extract_lexeme();
    let mut open = Token::new(TokenKind::EmbedOpenDelim, open_lexeme);
    attach_pending(&mut open, pending);
    tokens.push(open);

    let mut saw_inline_ws = false;
    while let Some(c) = scanner.peek() {
        if c == '\n' || !c.is_whitespace() {
            break;
        }
        scanner.advance();
        saw_inline_ws = true;
    }
    if saw_inline_ws {
        let lexeme = scanner.extract_lexeme();
        tokens.push(Token::new(TokenKind::Whitespace, lexeme));
    }

    if scanner.peek() == Some('\n') {
        scanner.advance();
        let lexeme = scanner.extract_lexeme();
        tokens.push(Token::new(TokenKind::EmbedPreambleNewline, lexeme));
    } else if scanner.peek().is_some() {
        while let Some(c) = scanner.peek() {
            if c == '\n' || (c == delim && scanner.peek_next() == Some(delim)) {
                break;
            }
            scanner.advance();
        }
        let lexeme = scanner.extract_lexeme();
        let trimmed = lexeme.text.as_str().trim().to_string();
        let value = KStr::new(&trimmed);
        tokens.push(Token::with_value(TokenKind::EmbedTag, lexeme, value));

        if scanner.peek() == Some('\n') {
            scanner.advance();
            let lexeme = scanner.extract_lexeme();
            tokens.push(Token::new(TokenKind::EmbedPreambleNewline, lexeme));
        }
    }

    // `scan_embed_body` consumes the closing delimiter itself (if found) as
    // part of its scan, so the selection we extract now spans content+close
    // together; split it back apart using the delimiter's byte width.
    let (rewritten, closed) = scan_embed_body(scanner, delim);
    let whole = scanner.extract_lexeme();
    if closed {
        let close_len = delim.len_utf8() * 2;
        let split_at = whole.text.len() - close_len;
        let content_text = &whole.text.as_str()[..split_at];
        let close_text = &whole.text.as_str()[split_at..];
        let content_end = whole.location.end_offset - close_len;

        let stripped = strip_common_indent(&rewritten);
        tokens.push(Token::with_value(
            TokenKind::EmbedContent,
            crate::scanner::Lexeme {
                text: KStr::new(content_text),
                location: crate::location::Location {
                    end_offset: content_end,
                    ..whole.location
                },
            },
            KStr::new(&stripped),
        ));
        tokens.push(Token::new(
            TokenKind::EmbedCloseDelim,
            crate::scanner::Lexeme {
                text: KStr::new(close_text),
                location: crate::location::Location {
                    start_offset: content_end,
                    ..whole.location
                },
            },
        ));
    } else {
        let stripped = strip_common_indent(&rewritten);
        tokens.push(Token::with_value(TokenKind::EmbedContent, whole, KStr::new(&stripped)));
    }
}

/// Consume the embed body up to (and including) its unescaped close
/// delimiter, returning the escape-resolved text and whether a close was
/// actually found (`false` at EOF — the parser reports `UnclosedEmbed`).
fn scan_embed_body(scanner: &mut Scanner<'_>, delim: char) -> (String, bool) {
    let mut rewritten = String::new();
    loop {
        match scanner.peek() {
            None => return (rewritten, false),
            Some(c) if c == delim => {
                scanner.advance();
                if scanner.peek() == Some(delim) {
                    scanner.advance();
                    return (rewritten, true);
                }
                let mut backslashes = 0;
                while scanner.peek() == Some('\\') {
                    scanner.advance();
                    backslashes += 1;
                }
                if backslashes > 0 && scanner.peek() == Some(delim) {
                    scanner.advance();
                    rewritten.push(delim);
                    for _ in 0..backslashes - 1 {
                        rewritten.push('\\');
                    }
                    rewritten.push(delim);
                } else {
                    rewritten.push(delim);
                    for _ in 0..backslashes {
                        rewritten.push('\\');
                    }
                }
            }
            Some(c) => {
                rewritten.push(c);
                scanner.advance();
            }
        }
    }
}

/// Minimum common indent across non-blank lines, stripped from every line;
/// lines narrower than that indent collapse to empty.
fn strip_common_indent(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.len() >= min_indent {
                line[min_indent..].to_string()
            } else {
                String::new()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn gap_free_tokens_cover_every_byte() {
        let source = "name: 'John' # hi\nage: 30";
        let tokens = tokenize(source, true);
        let joined: String = tokens.iter().map(|t| t.text()).collect();
        assert_eq!(joined, source);
    }

    #[test]
    fn non_gap_free_drops_trivia() {
        let tokens = tokenize("a: 1\n", false);
        assert!(!kinds(&tokens).contains(&TokenKind::Whitespace));
        assert!(!kinds(&tokens).contains(&TokenKind::Comment));
    }

    #[test]
    fn list_dash_vs_negative_number() {
        let tokens = tokenize("- -5", false);
        assert_eq!(tokens[0].kind, TokenKind::ListDash);
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text(), "-5");
    }

    #[test]
    fn reclassifies_reserved_identifiers() {
        let tokens = tokenize("true false null other", false);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn trailing_comment_attaches_to_next_token() {
        let tokens = tokenize("key: 1 # hi\nother: 2", false);
        let other = tokens.iter().find(|t| t.text() == "other").unwrap();
        assert_eq!(other.comments.len(), 1);
        assert_eq!(other.comments[0].as_str(), "hi");
        let one = tokens.iter().find(|t| t.text() == "1").unwrap();
        assert!(one.comments.is_empty());
    }

    #[test]
    fn embed_block_strips_common_indent() {
        let source = "sql: %%sqlite\n    SELECT 1\n%%";
        let tokens = tokenize(source, false);
        let tag = tokens.iter().find(|t| t.kind == TokenKind::EmbedTag).unwrap();
        assert_eq!(tag.value.as_str(), "sqlite");
        let content = tokens
            .iter()
            .find(|t| t.kind == TokenKind::EmbedContent)
            .unwrap();
        assert_eq!(content.value.as_str(), "SELECT 1\n");
    }

    #[test]
    fn embed_block_rewrites_escaped_delimiters() {
        let source = "%%\nab %\\% cd\n%%";
        let tokens = tokenize(source, false);
        let content = tokens
            .iter()
            .find(|t| t.kind == TokenKind::EmbedContent)
            .unwrap();
        assert_eq!(content.value.as_str(), "ab %% cd\n");
    }

    #[test]
    fn double_backslash_leaves_single_backslash() {
        let source = "%%\nab %\\\\% cd\n%%";
        let tokens = tokenize(source, false);
        let content = tokens
            .iter()
            .find(|t| t.kind == TokenKind::EmbedContent)
            .unwrap();
        assert_eq!(content.value.as_str(), "ab %\\% cd\n");
    }

    #[test]
    fn string_collects_unicode_escape() {
        let tokens = tokenize("'a\\u00e9b'", false);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::StringOpenQuote,
                TokenKind::String,
                TokenKind::StringUnicodeEscape,
                TokenKind::String,
                TokenKind::StringCloseQuote,
            ]
        );
        let escape = tokens.iter().find(|t| t.kind == TokenKind::StringUnicodeEscape).unwrap();
        assert_eq!(escape.text(), "\\u00e9");
        assert_eq!(escape.value.as_str(), "\u{e9}");
    }

    #[test]
    fn simple_escapes_decode_to_their_character() {
        let tokens = tokenize(r"'a\nb\tc\\d'", false);
        let escapes: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::StringEscape)
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(escapes, vec!["\n", "\t", "\\"]);
    }

    #[test]
    fn unterminated_string_omits_close_token() {
        let tokens = tokenize("'abc", false);
        assert!(!kinds(&tokens).contains(&TokenKind::StringCloseQuote));
    }

    #[test]
    fn illegal_character_continues_scanning() {
        let tokens = tokenize("a: ` b: 1", false);
        assert!(kinds(&tokens).contains(&TokenKind::IllegalChar));
        assert!(kinds(&tokens).contains(&TokenKind::Number));
    }
}
