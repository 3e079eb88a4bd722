//! A cheap, cloneable, immutable string.
//!
//! Parsed KSON documents are trees of small string fragments (identifiers,
//! object keys, embed tags, comment text) that get cloned repeatedly while
//! the marker tree is lowered into an AST and again while the AST is lowered
//! into a [`KsonValue`](crate::value::KsonValue). A thin, atomically-counted
//! allocation keeps that cheap instead of re-copying bytes at every step.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use triomphe::ThinArc;

/// An immutable, reference-counted string with a thin (single-word) pointer
/// representation: the length lives in the heap allocation alongside the
/// bytes rather than doubling the pointer the way `Arc<str>` does.
#[derive(Clone)]
pub struct KStr {
    // Invariant: must be well-formed UTF-8.
    bytes: ThinArc<(), u8>,
}

impl KStr {
    #[inline]
    pub fn new(value: &str) -> Self {
        Self {
            bytes: ThinArc::from_header_and_slice((), value.as_bytes()),
        }
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Safety: constructors only ever store bytes copied from a `&str`.
        unsafe { std::str::from_utf8_unchecked(&self.bytes.slice) }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.slice.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.slice.len()
    }

    /// Join a sequence of lines back together with `\n`, used by the embed
    /// lexer after indent-stripping each line of a block's body.
    pub fn from_lines(lines: &[String]) -> Self {
        Self::new(&lines.join("\n"))
    }
}

impl std::ops::Deref for KStr {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for KStr {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for KStr {
    #[inline]
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for KStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl fmt::Display for KStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl Default for KStr {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl Eq for KStr {}

impl<Other: AsRef<str>> PartialEq<Other> for KStr {
    #[inline]
    fn eq(&self, other: &Other) -> bool {
        self.as_str() == other.as_ref()
    }
}

impl Ord for KStr {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<Other: AsRef<str>> PartialOrd<Other> for KStr {
    #[inline]
    fn partial_cmp(&self, other: &Other) -> Option<std::cmp::Ordering> {
        self.as_str().partial_cmp(other.as_ref())
    }
}

impl std::hash::Hash for KStr {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl FromStr for KStr {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&'_ str> for KStr {
    #[inline]
    fn from(value: &'_ str) -> Self {
        Self::new(value)
    }
}

impl From<String> for KStr {
    #[inline]
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&'_ String> for KStr {
    #[inline]
    fn from(value: &'_ String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheap_clone_preserves_content() {
        let a = KStr::new("sqlite");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.as_str(), "sqlite");
    }

    #[test]
    fn equality_is_by_content() {
        assert_eq!(KStr::new("x"), "x");
        assert_ne!(KStr::new("x"), KStr::new("y"));
    }

    #[test]
    fn from_lines_joins_with_newline() {
        let lines = vec!["SELECT 1".to_string(), "".to_string()];
        assert_eq!(KStr::from_lines(&lines).as_str(), "SELECT 1\n");
    }
}
