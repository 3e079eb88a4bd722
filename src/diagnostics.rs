//! The diagnostic catalog.
//!
//! Every fallible condition the lexer, parser, schema parser, and schema
//! evaluator can report funnels through [`MessageKind`], a closed,
//! data-carrying enum with one `#[error("...")]` template per kind. A
//! [`Message`] pairs a `MessageKind` with the [`Location`] it applies to;
//! a [`MessageSink`] is the ordered collector both the parser and the
//! evaluator append to as they recover from errors and keep going.

use std::fmt;

use thiserror::Error;

use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MessageKind {
    // ---- lexing-origin (surfaced by the parser when it meets the token) ----
    #[error("illegal character `{text}`")]
    IllegalChar { text: String },
    #[error("illegal control character in string")]
    IllegalControlInString,
    #[error("dangling partial embed delimiter `{text}`")]
    DanglingEmbedDelimiterPartial { text: String },
    #[error("unterminated string")]
    UnclosedString,
    #[error("unterminated embed block")]
    UnclosedEmbed,

    // ---- parsing ----
    #[error("object is missing a closing `}}`")]
    ObjectNoClose,
    #[error("list is missing a closing `]`")]
    ListNoClose,
    #[error("dangling `-` with no list element")]
    DanglingListDash,
    #[error("a dash-list cannot directly contain another dash-list; wrap it in `[ ]`")]
    NestedDashList,
    #[error("invalid digits in number `{text}`")]
    InvalidDigits { text: String },
    #[error("illegal leading minus sign in number `{text}`")]
    IllegalMinusSign { text: String },
    #[error("dangling decimal point in number `{text}`")]
    DanglingDecimal { text: String },
    #[error("dangling exponent indicator in number `{text}`")]
    DanglingExpIndicator { text: String },
    #[error("unexpected trailing content after end of document")]
    EofNotReached,
    #[error("expected a value, found {found}")]
    ExpectedValue { found: String },
    #[error("expected `:` after key, found {found}")]
    ExpectedColon { found: String },
    #[error("expected a key (identifier or string), found {found}")]
    ExpectedKey { found: String },
    #[error("unexpected token {found}")]
    UnexpectedToken { found: String },

    // ---- schema parsing ----
    #[error("schema is empty")]
    SchemaEmpty,
    #[error("schema root must be an object or a boolean")]
    SchemaRootNotObjectOrBoolean,
    #[error("keyword `{keyword}` expects {expected}")]
    SchemaKeywordWrongType { keyword: String, expected: String },
    #[error("keyword `{keyword}` requires an integer-valued number")]
    SchemaIntegerRequired { keyword: String },
    #[error("`$ref` ignores sibling keyword `{property}`")]
    SchemaRefIgnoredProperty { property: String },
    #[error("`$ref` `{uri}` did not resolve to any schema in this document")]
    SchemaRefResolutionFailure { uri: String },
    #[error("pattern `{pattern}` is not a valid regular expression and was skipped")]
    SchemaInvalidRegex { pattern: String },
    #[error("duplicate `$id` `{uri}`")]
    SchemaDuplicateId { uri: String },

    // ---- schema evaluation ----
    #[error("expected type {expected:?}, found {found}")]
    TypeMismatch { expected: Vec<String>, found: String },
    #[error("value does not match any allowed `enum` member")]
    EnumMismatch,
    #[error("value does not match `const`")]
    ConstMismatch,
    #[error("{value} is less than the minimum of {minimum}")]
    MinimumViolation { value: f64, minimum: f64 },
    #[error("{value} is greater than the maximum of {maximum}")]
    MaximumViolation { value: f64, maximum: f64 },
    #[error("{value} is not strictly greater than the exclusive minimum of {minimum}")]
    ExclusiveMinimumViolation { value: f64, minimum: f64 },
    #[error("{value} is not strictly less than the exclusive maximum of {maximum}")]
    ExclusiveMaximumViolation { value: f64, maximum: f64 },
    #[error("{value} is not a multiple of {multiple_of}")]
    MultipleOfViolation { value: f64, multiple_of: f64 },
    #[error("string is shorter than minLength {min_length}")]
    MinLengthViolation { min_length: u64 },
    #[error("string is longer than maxLength {max_length}")]
    MaxLengthViolation { max_length: u64 },
    #[error("string does not match pattern `{pattern}`")]
    PatternMismatch { pattern: String },
    #[error("array has fewer than minItems {min_items}")]
    MinItemsViolation { min_items: u64 },
    #[error("array has more than maxItems {max_items}")]
    MaxItemsViolation { max_items: u64 },
    #[error("array items are not unique")]
    UniqueItemsViolation,
    #[error("array does not contain any item matching `contains`")]
    ContainsViolation,
    #[error("object has fewer than minProperties {min_properties}")]
    MinPropertiesViolation { min_properties: u64 },
    #[error("object has more than maxProperties {max_properties}")]
    MaxPropertiesViolation { max_properties: u64 },
    #[error("missing required property `{property}`")]
    RequiredPropertyMissing { property: String },
    #[error("property `{property}` is not allowed by `additionalProperties`")]
    AdditionalPropertyNotAllowed { property: String },
    #[error("item at index {index} is not allowed by `additionalItems`")]
    AdditionalItemNotAllowed { index: usize },
    #[error("property `{property}` requires property `{requires}`")]
    DependencyMissing { property: String, requires: String },
    #[error("value matched a schema under `not`")]
    NotViolation,
    #[error("value matched none of the schemas in `anyOf`")]
    AnyOfNoMatch,
    #[error("value matched none of the schemas in `oneOf`")]
    OneOfNoMatch,
    #[error("value matched {matched} schemas in `oneOf`, expected exactly one")]
    OneOfMultipleMatch { matched: usize },

    // ---- JSON pointer ----
    #[error("invalid escape sequence in JSON pointer token `{token}`")]
    PointerInvalidEscape { token: String },
    #[error("incomplete `~` escape at end of JSON pointer token `{token}`")]
    PointerIncompleteEscape { token: String },
    #[error("JSON pointer must be empty or start with `/`")]
    PointerBadStart,
    #[error("glob pointer ends with a dangling escape character")]
    GlobEscapeAtEnd,

    // ---- resource limits ----
    #[error("recursion limit reached while parsing")]
    RecursionLimitReached,
}

/// A single diagnostic: a [`MessageKind`] anchored to a [`Location`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub location: Location,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(location: Location, kind: MessageKind) -> Self {
        Self { location, kind }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fl, fc, ll, lc) = self.location.to_human();
        write!(f, "Error:{fl}.{fc} \u{2013} {ll}.{lc}, {}", self.kind)
    }
}

/// An ordered, structured collector of diagnostics.
///
/// Created once per compilation (parse, schema parse, or validate) and
/// drained by the caller; never shared across invocations.
#[derive(Debug, Clone, Default)]
pub struct MessageSink {
    messages: Vec<Message>,
}

impl MessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, location: Location, kind: MessageKind) {
        self.messages.push(Message::new(location, kind));
    }

    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn logged_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn extend(&mut self, other: MessageSink) {
        self.messages.extend(other.messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_contract_format() {
        let msg = Message::new(
            Location {
                first_line: 0,
                first_column: 4,
                last_line: 0,
                last_column: 7,
                start_offset: 4,
                end_offset: 7,
            },
            MessageKind::ObjectNoClose,
        );
        assert_eq!(
            msg.to_string(),
            "Error:1.5 \u{2013} 1.8, object is missing a closing `}`"
        );
    }

    #[test]
    fn sink_preserves_order() {
        let mut sink = MessageSink::new();
        sink.error(Location::default(), MessageKind::EofNotReached);
        sink.error(Location::default(), MessageKind::DanglingListDash);
        let kinds: Vec<_> = sink.logged_messages().iter().map(|m| &m.kind).collect();
        assert_eq!(kinds[0], &MessageKind::EofNotReached);
        assert_eq!(kinds[1], &MessageKind::DanglingListDash);
    }
}
