//! JSON Pointer (RFC 6901) and its glob extension.
//!
//! Two flavors share one token shape: [`JsonPointer::parse_strict`] only
//! ever produces `Literal` tokens (a bare `*` is just a character), while
//! [`JsonPointer::parse_glob`] additionally recognizes `*`, `**`, and
//! mixed-metacharacter segments. Both round-trip through
//! [`JsonPointer::from_tokens`]: re-escaping a decoded token always
//! reproduces the canonical raw form, even if the input used a
//! non-canonical escape.

use crate::diagnostics::MessageKind;
use crate::kstr::KStr;
use crate::location::Location;
use crate::value::KsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Strict,
    Glob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(KStr),
    Wildcard,
    RecursiveDescent,
    /// Raw segment text, still carrying its `*`/`?`/`\` metacharacters
    /// (escapes already resolved to their literal target, e.g. `\*` is
    /// stored as a literal `*` marked non-meta — see [`GlobAtom`]).
    GlobPattern(Vec<GlobAtom>),
}

/// One element of a compiled glob pattern, distinguishing an escaped
/// literal character from an active metacharacter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobAtom {
    Char(char),
    Star,
    Question,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    pub kind: PointerKind,
    pub tokens: Vec<Token>,
}

fn pointer_location(offset: usize) -> Location {
    Location::point(0, offset as u32, offset)
}

/// Decode one `/`-delimited raw segment's `~1`/`~0` escapes, in that order.
/// Returns the error token text (for diagnostics) on malformed escapes.
fn decode_tilde_escapes(segment: &str, start_offset: usize) -> Result<String, (MessageKind, Location)> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some((_, '1')) => {
                out.push('/');
                chars.next();
            }
            Some((_, '0')) => {
                out.push('~');
                chars.next();
            }
            Some((_, _other)) => {
                return Err((
                    MessageKind::PointerInvalidEscape { token: segment.to_string() },
                    pointer_location(start_offset + idx),
                ));
            }
            None => {
                return Err((
                    MessageKind::PointerIncompleteEscape { token: segment.to_string() },
                    pointer_location(start_offset + idx),
                ));
            }
        }
    }
    Ok(out)
}

/// Compile a glob segment's `*`/`?`/`\` metacharacters into atoms, or
/// decide it has none and should be a plain `Literal`.
fn compile_glob_segment(segment: &str, start_offset: usize) -> Result<Token, (MessageKind, Location)> {
    if segment == "*" {
        return Ok(Token::Wildcard);
    }
    if segment == "**" {
        return Ok(Token::RecursiveDescent);
    }
    let mut atoms = Vec::new();
    let mut has_meta = false;
    let mut chars = segment.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some((_, next)) if next == '*' || next == '?' || next == '\\' => {
                    atoms.push(GlobAtom::Char(next));
                }
                Some((_, next)) => atoms.push(GlobAtom::Char(next)),
                None => {
                    return Err((MessageKind::GlobEscapeAtEnd, pointer_location(start_offset + idx)));
                }
            },
            '*' => {
                has_meta = true;
                atoms.push(GlobAtom::Star);
            }
            '?' => {
                has_meta = true;
                atoms.push(GlobAtom::Question);
            }
            other => atoms.push(GlobAtom::Char(other)),
        }
    }
    if has_meta {
        Ok(Token::GlobPattern(atoms))
    } else {
        let literal: String = atoms
            .into_iter()
            .map(|a| match a {
                GlobAtom::Char(c) => c,
                _ => unreachable!("has_meta is false"),
            })
            .collect();
        Ok(Token::Literal(KStr::new(&literal)))
    }
}

impl JsonPointer {
    /// RFC-6901 strict parse: every segment becomes a `Literal` token.
    pub fn parse_strict(raw: &str) -> Result<Self, (MessageKind, Location)> {
        if raw.is_empty() {
            return Ok(Self { kind: PointerKind::Strict, tokens: Vec::new() });
        }
        if !raw.starts_with('/') {
            return Err((MessageKind::PointerBadStart, pointer_location(0)));
        }
        let mut tokens = Vec::new();
        let mut offset = 1;
        for segment in raw[1..].split('/') {
            let decoded = decode_tilde_escapes(segment, offset)?;
            tokens.push(Token::Literal(KStr::new(&decoded)));
            offset += segment.len() + 1;
        }
        Ok(Self { kind: PointerKind::Strict, tokens })
    }

    /// Glob parse: a segment that is exactly `*` or `**` becomes
    /// `Wildcard`/`RecursiveDescent`; a segment containing unescaped `*`
    /// or `?` becomes `GlobPattern`; everything else is `Literal`.
    pub fn parse_glob(raw: &str) -> Result<Self, (MessageKind, Location)> {
        if raw.is_empty() {
            return Ok(Self { kind: PointerKind::Glob, tokens: Vec::new() });
        }
        if !raw.starts_with('/') {
            return Err((MessageKind::PointerBadStart, pointer_location(0)));
        }
        let mut tokens = Vec::new();
        let mut offset = 1;
        for segment in raw[1..].split('/') {
            let decoded = decode_tilde_escapes(segment, offset)?;
            tokens.push(compile_glob_segment(&decoded, offset)?);
            offset += segment.len() + 1;
        }
        Ok(Self { kind: PointerKind::Glob, tokens })
    }

    fn encode_literal_segment(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '~' => out.push_str("~0"),
                '/' => out.push_str("~1"),
                other => out.push(other),
            }
        }
        out
    }

    fn encode_token(token: &Token) -> String {
        match token {
            Token::Literal(text) => Self::encode_literal_segment(text.as_str()),
            Token::Wildcard => "*".to_string(),
            Token::RecursiveDescent => "**".to_string(),
            Token::GlobPattern(atoms) => {
                let mut out = String::new();
                for atom in atoms {
                    match atom {
                        GlobAtom::Char(c @ ('*' | '?' | '\\')) => {
                            out.push('\\');
                            out.push(*c);
                        }
                        GlobAtom::Char(c) => {
                            if *c == '~' {
                                out.push_str("~0");
                            } else if *c == '/' {
                                out.push_str("~1");
                            } else {
                                out.push(*c);
                            }
                        }
                        GlobAtom::Star => out.push('*'),
                        GlobAtom::Question => out.push('?'),
                    }
                }
                out
            }
        }
    }

    /// Re-escape `tokens` into a canonical raw pointer string, choosing
    /// `~1`/`~0` regardless of which escape (if any) the original raw
    /// form used.
    pub fn from_tokens(kind: PointerKind, tokens: &[Token]) -> String {
        let _ = kind;
        if tokens.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        for token in tokens {
            out.push('/');
            out.push_str(&Self::encode_token(token));
        }
        out
    }

    pub fn to_raw(&self) -> String {
        Self::from_tokens(self.kind, &self.tokens)
    }
}

/// `*` matches any run of zero or more chars within the segment; `?`
/// matches exactly one char. Linear-time: each atom advances a single
/// cursor, with `star_atom`/`star_text` remembered only to resume after
/// a mismatch, never by re-entering the match function.
fn glob_pattern_matches(atoms: &[GlobAtom], text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let (mut ai, mut ti) = (0, 0);
    let (mut star_atom, mut star_text) = (None, 0);
    while ti < text.len() {
        if ai < atoms.len() {
            match &atoms[ai] {
                GlobAtom::Char(c) if Some(*c) == text.get(ti).copied() => {
                    ai += 1;
                    ti += 1;
                    continue;
                }
                GlobAtom::Question => {
                    ai += 1;
                    ti += 1;
                    continue;
                }
                GlobAtom::Star => {
                    star_atom = Some(ai);
                    star_text = ti;
                    ai += 1;
                    continue;
                }
                _ => {}
            }
        }
        if let Some(star) = star_atom {
            ai = star + 1;
            star_text += 1;
            ti = star_text;
        } else {
            return false;
        }
    }
    while ai < atoms.len() && atoms[ai] == GlobAtom::Star {
        ai += 1;
    }
    ai == atoms.len()
}

pub(crate) fn token_matches_segment(token: &Token, segment: &str) -> bool {
    match token {
        Token::Literal(text) => text.as_str() == segment,
        Token::GlobPattern(atoms) => glob_pattern_matches(atoms, segment),
        Token::Wildcard | Token::RecursiveDescent => true,
    }
}

/// Walk `value` along `pointer`'s tokens, strict or glob.
///
/// Strict pointers always produce at most one match; glob pointers can
/// fan out at `Wildcard`/`RecursiveDescent`/`GlobPattern` tokens, so the
/// result is a list.
pub fn navigate<'v>(value: &'v KsonValue, pointer: &JsonPointer) -> Vec<&'v KsonValue> {
    navigate_tokens(value, &pointer.tokens)
}

fn children_of(value: &KsonValue) -> Vec<(String, &KsonValue)> {
    match value {
        KsonValue::Object(object, _) => object.properties.iter().map(|(k, v)| (k.to_string(), v)).collect(),
        KsonValue::Array(items, _) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        _ => Vec::new(),
    }
}

fn navigate_tokens<'v>(value: &'v KsonValue, tokens: &[Token]) -> Vec<&'v KsonValue> {
    let Some((first, rest)) = tokens.split_first() else {
        return vec![value];
    };
    match first {
        Token::RecursiveDescent => {
            let mut out = navigate_tokens(value, rest);
            for (_, child) in children_of(value) {
                out.extend(navigate_tokens(child, tokens));
            }
            out
        }
        other => children_of(value)
            .into_iter()
            .filter(|(name, _)| token_matches_segment(other, name))
            .flat_map(|(_, child)| navigate_tokens(child, rest))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::KsonObject;

    fn obj(pairs: Vec<(&str, KsonValue)>) -> KsonValue {
        let mut object = KsonObject::new();
        for (k, v) in pairs {
            object.push(KStr::new(k), v);
        }
        KsonValue::Object(object, Location::default())
    }

    fn s(text: &str) -> KsonValue {
        KsonValue::String(KStr::new(text), Location::default())
    }

    #[test]
    fn strict_parse_decodes_escapes_in_order() {
        let p = JsonPointer::parse_strict("/a~1b/c~0d").unwrap();
        assert_eq!(
            p.tokens,
            vec![Token::Literal(KStr::new("a/b")), Token::Literal(KStr::new("c~d"))]
        );
    }

    #[test]
    fn strict_parse_rejects_bad_start() {
        let err = JsonPointer::parse_strict("a/b").unwrap_err();
        assert_eq!(err.0, MessageKind::PointerBadStart);
    }

    #[test]
    fn strict_parse_rejects_dangling_tilde() {
        let err = JsonPointer::parse_strict("/a~").unwrap_err();
        assert_eq!(err.0, MessageKind::PointerIncompleteEscape { token: "a~".to_string() });
    }

    #[test]
    fn strict_parse_rejects_invalid_escape() {
        let err = JsonPointer::parse_strict("/a~2b").unwrap_err();
        assert_eq!(err.0, MessageKind::PointerInvalidEscape { token: "a~2b".to_string() });
    }

    #[test]
    fn round_trip_chooses_canonical_escape() {
        let p = JsonPointer::parse_strict("/a~1b").unwrap();
        assert_eq!(JsonPointer::from_tokens(p.kind, &p.tokens), "/a~1b");
    }

    #[test]
    fn glob_parse_recognizes_wildcard_and_recursive_descent() {
        let p = JsonPointer::parse_glob("/*/**").unwrap();
        assert_eq!(p.tokens, vec![Token::Wildcard, Token::RecursiveDescent]);
    }

    #[test]
    fn glob_parse_compiles_mixed_pattern() {
        let p = JsonPointer::parse_glob("/a*b?c").unwrap();
        assert!(matches!(&p.tokens[0], Token::GlobPattern(_)));
        if let Token::GlobPattern(atoms) = &p.tokens[0] {
            assert!(glob_pattern_matches(atoms, "axxxbyc"));
            assert!(!glob_pattern_matches(atoms, "axxxbyyc"));
        }
    }

    #[test]
    fn glob_parse_rejects_dangling_escape() {
        let err = JsonPointer::parse_glob("/foo\\").unwrap_err();
        assert_eq!(err.0, MessageKind::GlobEscapeAtEnd);
    }

    #[test]
    fn navigate_strict_descends_one_path() {
        let root = obj(vec![("name", s("John")), ("age", s("30"))]);
        let p = JsonPointer::parse_strict("/name").unwrap();
        let found = navigate(&root, &p);
        assert_eq!(found, vec![&s("John")]);
    }

    #[test]
    fn navigate_wildcard_returns_every_child() {
        let root = obj(vec![("a", s("1")), ("b", s("2"))]);
        let p = JsonPointer::parse_glob("/*").unwrap();
        assert_eq!(navigate(&root, &p).len(), 2);
    }

    #[test]
    fn navigate_recursive_descent_includes_self_and_every_depth() {
        let inner = obj(vec![("target", s("hit"))]);
        let root = obj(vec![("child", inner)]);
        let p = JsonPointer::parse_glob("/**/target").unwrap();
        let found = navigate(&root, &p);
        assert_eq!(found, vec![&s("hit")]);
    }
}
