//! Walking a compiled schema alongside a document pointer.
//!
//! [`navigate_schema`] answers "which sub-schema(s) govern the value at
//! this pointer" — the mirror image of [`crate::pointer::navigate`], which
//! walks a *value* tree. `properties` / `patternProperties` /
//! `additionalProperties` / `items` / `additionalItems` and the same-path
//! combinators (`allOf` / `anyOf` / `oneOf`) are followed; `$ref` is
//! resolved and expanded like any other schema. Cycles (through `$ref`)
//! are broken with [`VisitedSet`], the explicit guard the evaluator's own
//! `eval` keeps inline as a bare `HashSet`.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::pointer::{token_matches_segment, JsonPointer, Token as PointerToken};
use crate::schema::id_lookup::SchemaIdLookup;
use crate::schema::{compile, AdditionalProperties, ItemsSchema, JsonSchema};

/// One schema node reached by [`navigate_schema`]. Borrowed when it lives
/// directly in the navigated tree; owned when it was compiled on the fly
/// to resolve a `$ref`.
pub struct SchemaNode<'s> {
    pub schema: Cow<'s, JsonSchema>,
}

impl<'s> SchemaNode<'s> {
    pub fn as_schema(&self) -> &JsonSchema {
        self.schema.as_ref()
    }
}

/// Cycle guard for `$ref` expansion during navigation, keyed by the
/// resolved absolute URI. One `VisitedSet` is scoped to a single
/// [`navigate_schema`] call.
#[derive(Debug, Default)]
pub struct VisitedSet {
    refs: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `uri` as visited; returns `false` if it was already present
    /// (the caller should not expand it again).
    fn enter(&mut self, uri: &str) -> bool {
        self.refs.insert(uri.to_string())
    }
}

/// Resolve `uri` through `lookup` and compile it fresh — navigation
/// doesn't keep a second store of pre-compiled `$ref` targets, mirroring
/// [`crate::schema::evaluator`]'s own on-demand `compile_ref_target`.
fn compile_ref_target(uri: &str, lookup: &SchemaIdLookup) -> Option<JsonSchema> {
    let (target_value, target_pointer) = crate::schema::resolve_ref(uri, lookup)?;
    let mut scratch_lookup = SchemaIdLookup::new();
    let mut scratch_sink = crate::diagnostics::MessageSink::new();
    Some(compile(&target_value, None, target_pointer, &mut scratch_lookup, &mut scratch_sink))
}

/// Expand `schema` (borrowed from the navigated tree) into every
/// same-path sub-schema that also constrains the value at this point:
/// itself, plus every `allOf`/`anyOf`/`oneOf` branch, following `$ref`
/// when present instead of any sibling keyword.
fn expand_borrowed<'s>(schema: &'s JsonSchema, lookup: &'s SchemaIdLookup, visited: &mut VisitedSet, out: &mut Vec<Cow<'s, JsonSchema>>) {
    let object = match schema {
        JsonSchema::Boolean(_) => {
            out.push(Cow::Borrowed(schema));
            return;
        }
        JsonSchema::Object(object) => object,
    };
    if let Some(uri) = &object.ref_ {
        if visited.enter(uri) {
            if let Some(compiled) = compile_ref_target(uri, lookup) {
                expand_owned(compiled, lookup, visited, out);
            }
        }
        return;
    }
    out.push(Cow::Borrowed(schema));
    for sub in &object.all_of {
        expand_borrowed(sub, lookup, visited, out);
    }
    for sub in &object.any_of {
        expand_borrowed(sub, lookup, visited, out);
    }
    for sub in &object.one_of {
        expand_borrowed(sub, lookup, visited, out);
    }
}

/// Same as [`expand_borrowed`], but for a schema that was just compiled
/// on the fly (a `$ref` target) and so cannot be borrowed with the outer
/// lifetime — its sub-schemas are cloned out as they're discovered.
fn expand_owned<'s>(schema: JsonSchema, lookup: &'s SchemaIdLookup, visited: &mut VisitedSet, out: &mut Vec<Cow<'s, JsonSchema>>) {
    let object = match &schema {
        JsonSchema::Boolean(_) => {
            out.push(Cow::Owned(schema));
            return;
        }
        JsonSchema::Object(object) => object.clone(),
    };
    if let Some(uri) = &object.ref_ {
        if visited.enter(uri) {
            if let Some(compiled) = compile_ref_target(uri, lookup) {
                expand_owned(compiled, lookup, visited, out);
            }
        }
        return;
    }
    out.push(Cow::Owned(JsonSchema::Object(object.clone())));
    for sub in object.all_of.iter().cloned() {
        expand_owned(sub, lookup, visited, out);
    }
    for sub in object.any_of.iter().cloned() {
        expand_owned(sub, lookup, visited, out);
    }
    for sub in object.one_of.iter().cloned() {
        expand_owned(sub, lookup, visited, out);
    }
}

fn expand<'s>(schema: Cow<'s, JsonSchema>, lookup: &'s SchemaIdLookup, visited: &mut VisitedSet, out: &mut Vec<Cow<'s, JsonSchema>>) {
    match schema {
        Cow::Borrowed(schema) => expand_borrowed(schema, lookup, visited, out),
        Cow::Owned(schema) => expand_owned(schema, lookup, visited, out),
    }
}

/// One hop into every sub-schema of `nodes` that applies at `token` —
/// `properties` / `patternProperties` / `additionalProperties` for
/// object-shaped schemas, `items` / `additionalItems` for array indices.
/// A `Wildcard` or `RecursiveDescent` token fans into every declared
/// property plus `additionalProperties`/single-schema `items`, since no
/// concrete child name is known to check against `patternProperties` or
/// a tuple slot's own index.
fn step<'s>(nodes: &[Cow<'s, JsonSchema>], token: &PointerToken, lookup: &'s SchemaIdLookup, visited: &mut VisitedSet) -> Vec<Cow<'s, JsonSchema>> {
    let mut out = Vec::new();
    let fans_out = matches!(token, PointerToken::Wildcard | PointerToken::RecursiveDescent);

    for node in nodes {
        let Some(object) = node.as_ref().as_object() else {
            continue;
        };

        for (name, child) in &object.properties {
            if token_matches_segment(token, name) {
                expand_owned(child.clone(), lookup, visited, &mut out);
            }
        }
        if let PointerToken::Literal(name) = token {
            for (pattern, child) in &object.pattern_properties {
                if pattern.is_match(name.as_str()) {
                    expand_owned(child.clone(), lookup, visited, &mut out);
                }
            }
        }
        if fans_out {
            if let Some(AdditionalProperties::Schema(add)) = &object.additional_properties {
                expand_owned((**add).clone(), lookup, visited, &mut out);
            }
        }

        match &object.items {
            Some(ItemsSchema::Single(items)) => {
                if fans_out || matches!(token, PointerToken::Literal(name) if name.as_str().parse::<usize>().is_ok()) {
                    expand_owned((**items).clone(), lookup, visited, &mut out);
                }
            }
            Some(ItemsSchema::Tuple(tuple)) => {
                if let PointerToken::Literal(name) = token {
                    if let Ok(index) = name.as_str().parse::<usize>() {
                        match tuple.get(index) {
                            Some(child) => expand_owned(child.clone(), lookup, visited, &mut out),
                            None => {
                                if let Some(additional) = &object.additional_items {
                                    expand_owned((**additional).clone(), lookup, visited, &mut out);
                                }
                            }
                        }
                    }
                } else if fans_out {
                    for child in tuple {
                        expand_owned(child.clone(), lookup, visited, &mut out);
                    }
                    if let Some(additional) = &object.additional_items {
                        expand_owned((**additional).clone(), lookup, visited, &mut out);
                    }
                }
            }
            None => {}
        }
    }
    out
}

fn walk<'s>(nodes: Vec<Cow<'s, JsonSchema>>, tokens: &[PointerToken], lookup: &'s SchemaIdLookup, visited: &mut VisitedSet) -> Vec<Cow<'s, JsonSchema>> {
    let Some((first, rest)) = tokens.split_first() else {
        return nodes;
    };
    match first {
        PointerToken::RecursiveDescent => {
            // Zero-level match: the remaining pointer applies directly here.
            let mut out = walk(nodes.clone(), rest, lookup, visited);
            // One level deeper, still looking to satisfy the same `**` plus
            // whatever follows it.
            let children = step(&nodes, first, lookup, visited);
            if !children.is_empty() {
                out.extend(walk(children, tokens, lookup, visited));
            }
            out
        }
        other => {
            let children = step(&nodes, other, lookup, visited);
            walk(children, rest, lookup, visited)
        }
    }
}

fn identity_key(schema: &JsonSchema) -> String {
    match schema {
        JsonSchema::Boolean(b) => format!("bool:{b}"),
        JsonSchema::Object(object) => object.pointer.to_raw(),
    }
}

fn dedup<'s>(nodes: Vec<Cow<'s, JsonSchema>>) -> Vec<Cow<'s, JsonSchema>> {
    let mut seen = HashSet::new();
    nodes.into_iter().filter(|node| seen.insert(identity_key(node))).collect()
}

/// Walk `pointer` through `schema`, returning every sub-schema that
/// governs a value at that path. Unordered; unique by node identity
/// (the document pointer a sub-schema was compiled from).
pub fn navigate_schema<'s>(schema: &'s JsonSchema, pointer: &JsonPointer, lookup: &'s SchemaIdLookup) -> Vec<SchemaNode<'s>> {
    let mut visited = VisitedSet::new();
    let mut roots = Vec::new();
    expand_borrowed(schema, lookup, &mut visited, &mut roots);
    let found = walk(roots, &pointer.tokens, lookup, &mut visited);
    dedup(found).into_iter().map(|schema| SchemaNode { schema }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn schema_of(source: &str) -> (JsonSchema, SchemaIdLookup) {
        let (schema, lookup, sink) = parse_schema(source);
        assert!(!sink.has_errors(), "{sink:?}");
        (schema.unwrap(), lookup)
    }

    #[test]
    fn navigates_into_a_declared_property() {
        let (schema, lookup) = schema_of("type: object\nproperties: {\n  name: { type: string }\n}");
        let pointer = JsonPointer::parse_strict("/name").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_schema().as_object().unwrap().type_.as_deref(), Some(&["string".to_string()][..]));
    }

    #[test]
    fn wildcard_fans_into_every_property() {
        let (schema, lookup) = schema_of("type: object\nproperties: {\n  a: { type: string }\n  b: { type: number }\n}");
        let pointer = JsonPointer::parse_glob("/*").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn empty_pointer_expands_all_of_branches() {
        let (schema, lookup) = schema_of("allOf: [ { minimum: 1 }, { maximum: 9 } ]");
        let pointer = JsonPointer::parse_strict("").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        // Root (no own constraints besides allOf) plus the two branches.
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn tuple_items_navigate_by_index() {
        let (schema, lookup) = schema_of("items: [ { type: string }, { type: number } ]");
        let pointer = JsonPointer::parse_strict("/1").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_schema().as_object().unwrap().type_.as_deref(), Some(&["number".to_string()][..]));
    }

    #[test]
    fn recursive_descent_finds_a_nested_property_schema() {
        let (schema, lookup) = schema_of("properties: {\n  child: {\n    properties: {\n      target: { type: boolean }\n    }\n  }\n}");
        let pointer = JsonPointer::parse_glob("/**/target").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_schema().as_object().unwrap().type_.as_deref(), Some(&["boolean".to_string()][..]));
    }

    #[test]
    fn ref_target_is_followed() {
        let source = "definitions: {\n  named: { $id: 'kson-schema:named', type: string }\n}\nproperties: {\n  alias: { $ref: 'kson-schema:named' }\n}";
        let (schema, lookup) = schema_of(source);
        let pointer = JsonPointer::parse_strict("/alias").unwrap();
        let found = navigate_schema(&schema, &pointer, &lookup);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_schema().as_object().unwrap().type_.as_deref(), Some(&["string".to_string()][..]));
    }
}
