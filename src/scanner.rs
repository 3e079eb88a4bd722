//! Character-level cursor discipline for the lexer.
//!
//! The scanner is the only thing in the crate that touches raw `char`
//! boundaries; everything above it (the lexer) works in terms of
//! [`Lexeme`] slices and [`Location`]s so that it can never miscount a
//! multi-byte character as one column.

use crate::kstr::KStr;
use crate::location::Location;

/// A slice of source text together with the location it came from.
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub text: KStr,
    pub location: Location,
}

pub struct Scanner<'a> {
    source: &'a str,
    offset: usize,
    line: u32,
    column: u32,
    sel_start_offset: usize,
    sel_start_line: u32,
    sel_start_column: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 0,
            column: 0,
            sel_start_offset: 0,
            sel_start_line: 0,
            sel_start_column: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// The next character, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character after next, without consuming either.
    pub fn peek_next(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    /// Consume and return one Unicode scalar value, updating line/column
    /// bookkeeping. `\n` advances the line and resets the column; every
    /// other scalar advances the column by one (KSON has no tab-stop
    /// expansion — columns count scalars, not display width).
    ///
    /// # Panics
    ///
    /// Panics if called at end of input. Callers must check [`Self::peek`]
    /// first; advancing past a character that was never observed would be
    /// a bug in the caller, not a recoverable condition.
    pub fn advance(&mut self) -> char {
        let c = self
            .peek()
            .expect("Scanner::advance called at end of source without a prior peek()");
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        c
    }

    /// Return the text and location of everything consumed since the last
    /// call to `extract_lexeme` (or since the scanner was created), and
    /// start a fresh selection at the current position.
    pub fn extract_lexeme(&mut self) -> Lexeme {
        debug_assert!(self.sel_start_offset <= self.offset);
        let text = KStr::new(&self.source[self.sel_start_offset..self.offset]);
        let location = Location {
            first_line: self.sel_start_line,
            first_column: self.sel_start_column,
            last_line: self.line,
            last_column: self.column,
            start_offset: self.sel_start_offset,
            end_offset: self.offset,
        };
        self.sel_start_offset = self.offset;
        self.sel_start_line = self.line;
        self.sel_start_column = self.column;
        Lexeme { text, location }
    }

    /// Snapshot the current position without mutating anything.
    pub fn current_location(&self) -> Location {
        Location::point(self.line, self.column, self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut s = Scanner::new("ab\ncd");
        s.advance();
        s.advance();
        assert_eq!(s.current_location(), Location::point(0, 2, 2));
        s.advance(); // the newline
        assert_eq!(s.current_location(), Location::point(1, 0, 3));
        s.advance();
        assert_eq!(s.current_location(), Location::point(1, 1, 4));
    }

    #[test]
    fn extract_lexeme_resets_selection() {
        let mut s = Scanner::new("abc");
        s.advance();
        s.advance();
        let lexeme = s.extract_lexeme();
        assert_eq!(lexeme.text.as_str(), "ab");
        s.advance();
        let lexeme2 = s.extract_lexeme();
        assert_eq!(lexeme2.text.as_str(), "c");
    }

    #[test]
    fn handles_multibyte_scalars_as_one_column() {
        let mut s = Scanner::new("a\u{00e9}b");
        s.advance();
        s.advance();
        assert_eq!(s.current_location().start_offset, 3);
        assert_eq!(s.current_location().first_column, 2);
    }

    #[test]
    #[should_panic]
    fn advance_past_eof_panics() {
        let mut s = Scanner::new("");
        s.advance();
    }
}
