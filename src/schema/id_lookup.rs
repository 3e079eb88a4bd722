//! Document-local `$id` index.
//!
//! Every `$id` encountered while parsing a schema is resolved against the
//! base URI in scope (the nearest enclosing `$id`, or the bare string if
//! there is none yet) and recorded here. All `$ref` resolution goes
//! through [`SchemaIdLookup::resolve`] — there is no network or
//! filesystem fetching (see the crate's non-goals).

use indexmap::IndexMap;

use crate::pointer::JsonPointer;
use crate::value::KsonValue;

#[derive(Debug, Clone, Default)]
pub struct SchemaIdLookup {
    entries: IndexMap<String, (KsonValue, JsonPointer)>,
    root: Option<KsonValue>,
}

impl SchemaIdLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the document root a document-local `$ref` fragment (e.g.
    /// `#/definitions/x`, with no `$id` of its own) resolves against.
    pub fn set_root(&mut self, value: KsonValue) {
        self.root = Some(value);
    }

    pub fn root(&self) -> Option<&KsonValue> {
        self.root.as_ref()
    }

    /// Record `uri → (value, pointer)`. Returns `false` without
    /// overwriting the existing entry if `uri` is already indexed — the
    /// caller reports `SchemaDuplicateId` in that case.
    pub fn insert(&mut self, uri: String, value: KsonValue, pointer: JsonPointer) -> bool {
        if self.entries.contains_key(&uri) {
            return false;
        }
        self.entries.insert(uri, (value, pointer));
        true
    }

    pub fn resolve(&self, uri: &str) -> Option<(&KsonValue, &JsonPointer)> {
        self.entries.get(uri).map(|(value, pointer)| (value, pointer))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KsonValue, &JsonPointer)> {
        self.entries.iter().map(|(uri, (value, pointer))| (uri.as_str(), value, pointer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut lookup = SchemaIdLookup::new();
        let pointer = JsonPointer { kind: crate::pointer::PointerKind::Strict, tokens: Vec::new() };
        assert!(lookup.insert("https://e.com/a".into(), KsonValue::Null(Location::default()), pointer.clone()));
        assert!(!lookup.insert("https://e.com/a".into(), KsonValue::Null(Location::default()), pointer));
        assert_eq!(lookup.len(), 1);
    }
}
