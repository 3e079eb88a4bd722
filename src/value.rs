//! The semantic value model consumed by schema evaluation.
//!
//! `KsonValue` is deliberately flatter than [`crate::ast::AstNode`]: it
//! drops comments and keeps only what schema validation and pointer
//! navigation need — the shape of the data and, for diagnostics, the
//! source span each value came from.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::ast::AstNode;
use crate::kstr::KStr;
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub enum KsonValue {
    Null(Location),
    Bool(bool, Location),
    /// The parsed double alongside the raw source text, so re-serialization
    /// can stay faithful to e.g. leading zeros.
    Number(OrderedFloat<f64>, KStr, Location),
    String(KStr, Location),
    Array(Vec<KsonValue>, Location),
    Object(KsonObject, Location),
    Embed(EmbedValue, Location),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedValue {
    pub tag: Option<KStr>,
    pub content: KStr,
}

/// Insertion-ordered properties with a last-writer-wins lookup index.
/// Duplicate keys are preserved in `properties` (for diagnostics) even
/// though `lookup` only ever resolves to the final occurrence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KsonObject {
    pub properties: Vec<(KStr, KsonValue)>,
    lookup: IndexMap<KStr, usize>,
}

impl KsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: KStr, value: KsonValue) {
        let index = self.properties.len();
        self.lookup.insert(key.clone(), index);
        self.properties.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&KsonValue> {
        self.lookup.get(key).map(|&i| &self.properties[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl KsonValue {
    pub fn location(&self) -> Location {
        match self {
            KsonValue::Null(loc)
            | KsonValue::Bool(_, loc)
            | KsonValue::Number(_, _, loc)
            | KsonValue::String(_, loc)
            | KsonValue::Array(_, loc)
            | KsonValue::Object(_, loc)
            | KsonValue::Embed(_, loc) => *loc,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            KsonValue::Null(_) => "null",
            KsonValue::Bool(_, _) => "boolean",
            KsonValue::Number(..) => "number",
            KsonValue::String(..) => "string",
            KsonValue::Array(..) => "array",
            KsonValue::Object(..) => "object",
            KsonValue::Embed(..) => "embed",
        }
    }

    pub fn as_object(&self) -> Option<&KsonObject> {
        match self {
            KsonValue::Object(o, _) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[KsonValue]> {
        match self {
            KsonValue::Array(a, _) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KsonValue::String(s, _) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KsonValue::Number(n, _, _) => Some(n.0),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KsonValue::Bool(b, _) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KsonValue::Null(_))
    }

    /// Lower a lowered AST node into the flatter semantic value — drops
    /// comments and an `object_definition`'s optional name, which schema
    /// validation and pointer navigation never need.
    pub fn from_ast(node: &AstNode) -> KsonValue {
        match node {
            AstNode::KsonRoot { content, location, .. } => match content {
                Some(inner) => Self::from_ast(inner),
                None => KsonValue::Null(*location),
            },
            AstNode::ObjectDefinition { internals, .. } => Self::from_ast(internals),
            AstNode::ObjectInternals { properties, location } => {
                let mut object = KsonObject::new();
                for property in properties {
                    if let AstNode::ObjectProperty { key, value, .. } = property {
                        object.push(key.clone(), Self::from_ast(value));
                    }
                }
                KsonValue::Object(object, *location)
            }
            AstNode::List { elements, location } => {
                let items = elements
                    .iter()
                    .map(|element| match element {
                        AstNode::ListElement { value, .. } => Self::from_ast(value),
                        other => Self::from_ast(other),
                    })
                    .collect();
                KsonValue::Array(items, *location)
            }
            AstNode::EmbedBlock { tag, content, location } => KsonValue::Embed(
                EmbedValue { tag: tag.clone(), content: content.clone() },
                *location,
            ),
            AstNode::Identifier { text, location } | AstNode::Str { text, location } => {
                KsonValue::String(text.clone(), *location)
            }
            AstNode::Number { text, value, location } => {
                KsonValue::Number(OrderedFloat(*value), text.clone(), *location)
            }
            AstNode::True(location) => KsonValue::Bool(true, *location),
            AstNode::False(location) => KsonValue::Bool(false, *location),
            AstNode::Null(location) => KsonValue::Null(*location),
            // Reached only if a caller passes a bare `ObjectProperty`/`ListElement`
            // directly; both are always unwrapped by their parent above.
            AstNode::ObjectProperty { value, .. } | AstNode::ListElement { value, .. } => Self::from_ast(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_preserve_both_but_lookup_keeps_last() {
        let mut object = KsonObject::new();
        object.push(KStr::new("a"), KsonValue::Number(OrderedFloat(1.0), KStr::new("1"), Location::default()));
        object.push(KStr::new("a"), KsonValue::Number(OrderedFloat(2.0), KStr::new("2"), Location::default()));
        assert_eq!(object.properties.len(), 2);
        assert_eq!(object.get("a").and_then(KsonValue::as_f64), Some(2.0));
    }

    #[test]
    fn from_ast_lowers_a_parsed_document() {
        use crate::lexer::tokenize;
        use crate::parser::Parser;

        let (builder, sink) = Parser::new(tokenize("name: 'John'\nage: 30", false)).parse();
        assert!(!sink.has_errors());
        let ast = crate::ast::lower(&builder).expect("clean parse lowers");
        let value = KsonValue::from_ast(&ast);
        let object = value.as_object().expect("root is an object");
        assert_eq!(object.get("name").and_then(KsonValue::as_str), Some("John"));
        assert_eq!(object.get("age").and_then(KsonValue::as_f64), Some(30.0));
    }
}
