//! JSON-Schema-Draft-7 model and validator.
//!
//! A schema document is parsed as KSON first (reusing the same
//! scanner/lexer/parser/lowering pipeline as any other document) and then
//! *compiled*: [`compile`] walks the resulting [`KsonValue`] tree once,
//! building a typed [`JsonSchema`] and indexing every `$id` it finds into
//! a [`SchemaIdLookup`] keyed by absolute URI. Evaluation
//! ([`evaluator::validate`]) and navigation ([`navigator::navigate_schema`])
//! both work purely off that compiled form — neither re-reads KSON source.

pub mod evaluator;
pub mod id_lookup;
pub mod navigator;

pub use id_lookup::SchemaIdLookup;

use regex::Regex;
use url::Url;

use crate::diagnostics::{MessageKind, MessageSink};
use crate::location::Location;
use crate::pointer::{JsonPointer, PointerKind, Token as PointerToken};
use crate::value::KsonValue;

#[derive(Debug, Clone)]
pub enum JsonSchema {
    Boolean(bool),
    Object(Box<SchemaObject>),
}

#[derive(Debug, Clone)]
pub enum ItemsSchema {
    Single(Box<JsonSchema>),
    Tuple(Vec<JsonSchema>),
}

#[derive(Debug, Clone)]
pub enum AdditionalProperties {
    Schema(Box<JsonSchema>),
    False,
}

#[derive(Debug, Clone)]
pub enum Dependency {
    Schema(Box<JsonSchema>),
    PropertyNames(Vec<String>),
}

/// One compiled schema object. Every field mirrors a draft-07 keyword;
/// absence (`None` / empty collection) means the keyword was not present.
#[derive(Debug, Clone)]
pub struct SchemaObject {
    pub id: Option<String>,
    /// Pointer from the document root to the KSON value this schema was
    /// compiled from — identity for [`navigator::SchemaNode`] and the key
    /// `definitions_iter` walks by.
    pub pointer: JsonPointer,
    pub location: Location,

    pub type_: Option<Vec<String>>,
    pub enum_: Option<Vec<KsonValue>>,
    pub const_: Option<KsonValue>,
    pub format: Option<String>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Regex>,

    pub items: Option<ItemsSchema>,
    pub additional_items: Option<Box<JsonSchema>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub contains: Option<Box<JsonSchema>>,

    pub properties: Vec<(String, JsonSchema)>,
    pub pattern_properties: Vec<(Regex, JsonSchema)>,
    pub additional_properties: Option<AdditionalProperties>,
    pub required: Vec<String>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
    pub dependencies: Vec<(String, Dependency)>,

    pub all_of: Vec<JsonSchema>,
    pub any_of: Vec<JsonSchema>,
    pub one_of: Vec<JsonSchema>,
    pub not: Option<Box<JsonSchema>>,

    pub if_: Option<Box<JsonSchema>>,
    pub then: Option<Box<JsonSchema>>,
    pub else_: Option<Box<JsonSchema>>,

    /// Resolved absolute URI a `$ref` points at (sibling keywords other
    /// than `title`/`description` were flagged and dropped during
    /// compilation, per §4.5).
    pub ref_: Option<String>,
}

impl SchemaObject {
    fn new(pointer: JsonPointer, location: Location) -> Self {
        Self {
            id: None,
            pointer,
            location,
            type_: None,
            enum_: None,
            const_: None,
            format: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
            multiple_of: None,
            min_length: None,
            max_length: None,
            pattern: None,
            items: None,
            additional_items: None,
            min_items: None,
            max_items: None,
            unique_items: false,
            contains: None,
            properties: Vec::new(),
            pattern_properties: Vec::new(),
            additional_properties: None,
            required: Vec::new(),
            min_properties: None,
            max_properties: None,
            dependencies: Vec::new(),
            all_of: Vec::new(),
            any_of: Vec::new(),
            one_of: Vec::new(),
            not: None,
            if_: None,
            then: None,
            else_: None,
            ref_: None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&JsonSchema> {
        self.properties.iter().find(|(key, _)| key == name).map(|(_, schema)| schema)
    }
}

impl JsonSchema {
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            JsonSchema::Object(object) => Some(object),
            JsonSchema::Boolean(_) => None,
        }
    }

    pub fn pointer(&self) -> Option<&JsonPointer> {
        self.as_object().map(|o| &o.pointer)
    }

    /// Every indexed sub-schema by absolute URI, for consumers of a
    /// bundled (multi-`$id`) document.
    pub fn definitions_iter(lookup: &SchemaIdLookup) -> impl Iterator<Item = (&str, &KsonValue, &JsonPointer)> {
        lookup.iter()
    }
}

/// Parse `source` as KSON, then compile it into a [`JsonSchema`],
/// indexing every `$id` (and the document root, for local `$ref`
/// fragments) into a [`SchemaIdLookup`] the caller keeps for validation.
pub fn parse_schema(source: &str) -> (Option<JsonSchema>, SchemaIdLookup, MessageSink) {
    let outcome = crate::api::parse(source, crate::api::ParseOptions::default());
    let mut sink = outcome.messages;
    let mut lookup = SchemaIdLookup::new();
    let Some(value) = outcome.value else {
        return (None, lookup, sink);
    };
    lookup.set_root(value.clone());
    let pointer = JsonPointer { kind: PointerKind::Strict, tokens: Vec::new() };
    let schema = compile(&value, None, pointer, &mut lookup, &mut sink);
    (Some(schema), lookup, sink)
}

fn resolve_uri(base: Option<&Url>, raw: &str) -> Url {
    base.and_then(|b| b.join(raw).ok())
        .or_else(|| Url::parse(raw).ok())
        .unwrap_or_else(|| Url::parse(&format!("kson-schema:{raw}")).unwrap_or_else(|_| Url::parse("kson-schema:#").unwrap()))
}

/// Resolve a `$ref` string to the raw value it targets, plus the document
/// pointer that value lives at. A bare `#`/`#/...` fragment (no `$id` of
/// its own) is a JSON pointer into [`SchemaIdLookup::root`]; anything else
/// is looked up by the absolute URI an `$id` registered.
pub(crate) fn resolve_ref(uri: &str, lookup: &SchemaIdLookup) -> Option<(KsonValue, JsonPointer)> {
    if let Some(fragment) = uri.strip_prefix('#') {
        let pointer = JsonPointer::parse_strict(fragment).ok()?;
        let root = lookup.root()?;
        let target = crate::pointer::navigate(root, &pointer).into_iter().next()?;
        Some((target.clone(), pointer))
    } else {
        lookup.resolve(uri).map(|(value, pointer)| (value.clone(), pointer.clone()))
    }
}

fn child_pointer(pointer: &JsonPointer, segment: &str) -> JsonPointer {
    let mut tokens = pointer.tokens.clone();
    tokens.push(PointerToken::Literal(crate::kstr::KStr::new(segment)));
    JsonPointer { kind: pointer.kind, tokens }
}

fn indexed_pointer(pointer: &JsonPointer, segment: &str, index: usize) -> JsonPointer {
    let base = child_pointer(pointer, segment);
    let mut tokens = base.tokens;
    tokens.push(PointerToken::Literal(crate::kstr::KStr::new(&index.to_string())));
    JsonPointer { kind: base.kind, tokens }
}

fn named_pointer(pointer: &JsonPointer, segment: &str, name: &str) -> JsonPointer {
    let base = child_pointer(pointer, segment);
    let mut tokens = base.tokens;
    tokens.push(PointerToken::Literal(crate::kstr::KStr::new(name)));
    JsonPointer { kind: base.kind, tokens }
}

fn as_string_list(value: &KsonValue) -> Option<Vec<String>> {
    match value {
        KsonValue::String(s, _) => Some(vec![s.to_string()]),
        KsonValue::Array(items, _) => items.iter().map(|item| item.as_str().map(str::to_string)).collect(),
        _ => None,
    }
}

fn as_integer(value: &KsonValue, keyword: &str, sink: &mut MessageSink) -> Option<u64> {
    let n = value.as_f64()?;
    if n.fract() != 0.0 || n < 0.0 {
        sink.error(value.location(), MessageKind::SchemaIntegerRequired { keyword: keyword.to_string() });
        return None;
    }
    Some(n as u64)
}

fn compile_regex(pattern: &str, location: Location, sink: &mut MessageSink) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(_) => {
            sink.error(location, MessageKind::SchemaInvalidRegex { pattern: pattern.to_string() });
            None
        }
    }
}

/// Compile one KSON value (already parsed, never re-lexed) into a
/// [`JsonSchema`], recursing into every keyword that nests sub-schemas.
pub fn compile(
    value: &KsonValue,
    base: Option<&Url>,
    pointer: JsonPointer,
    lookup: &mut SchemaIdLookup,
    sink: &mut MessageSink,
) -> JsonSchema {
    if let Some(b) = value.as_bool() {
        return JsonSchema::Boolean(b);
    }
    let Some(object) = value.as_object() else {
        sink.error(value.location(), MessageKind::SchemaRootNotObjectOrBoolean);
        return JsonSchema::Boolean(true);
    };

    let mut own_base = base.map(Url::clone);
    let mut schema = SchemaObject::new(pointer.clone(), value.location());

    if let Some(id_value) = object.get("$id") {
        if let Some(id_str) = id_value.as_str() {
            let resolved = resolve_uri(base, id_str);
            schema.id = Some(resolved.to_string());
            if !lookup.insert(resolved.to_string(), value.clone(), pointer.clone()) {
                sink.error(id_value.location(), MessageKind::SchemaDuplicateId { uri: resolved.to_string() });
            }
            own_base = Some(resolved);
        }
    }
    let own_base = own_base.as_ref();

    if let Some(ref_value) = object.get("$ref") {
        if let Some(raw) = ref_value.as_str() {
            schema.ref_ = Some(if raw.starts_with('#') { raw.to_string() } else { resolve_uri(own_base, raw).to_string() });
        }
        for (key, _) in &object.properties {
            if key.as_str() != "$ref" && key.as_str() != "title" && key.as_str() != "description" {
                sink.error(value.location(), MessageKind::SchemaRefIgnoredProperty { property: key.to_string() });
            }
        }
        return JsonSchema::Object(Box::new(schema));
    }

    if let Some(type_value) = object.get("type") {
        match as_string_list(type_value) {
            Some(list) => schema.type_ = Some(list),
            None => sink.error(
                type_value.location(),
                MessageKind::SchemaKeywordWrongType { keyword: "type".to_string(), expected: "string or array of strings".to_string() },
            ),
        }
    }
    if let Some(enum_value) = object.get("enum") {
        match enum_value.as_array() {
            Some(items) => schema.enum_ = Some(items.to_vec()),
            None => sink.error(
                enum_value.location(),
                MessageKind::SchemaKeywordWrongType { keyword: "enum".to_string(), expected: "array".to_string() },
            ),
        }
    }
    if let Some(const_value) = object.get("const") {
        schema.const_ = Some(const_value.clone());
    }
    if let Some(format_value) = object.get("format") {
        schema.format = format_value.as_str().map(str::to_string);
    }

    schema.minimum = object.get("minimum").and_then(KsonValue::as_f64);
    schema.maximum = object.get("maximum").and_then(KsonValue::as_f64);
    schema.exclusive_minimum = object.get("exclusiveMinimum").and_then(KsonValue::as_f64);
    schema.exclusive_maximum = object.get("exclusiveMaximum").and_then(KsonValue::as_f64);
    schema.multiple_of = object.get("multipleOf").and_then(KsonValue::as_f64);

    if let Some(v) = object.get("minLength") {
        schema.min_length = as_integer(v, "minLength", sink);
    }
    if let Some(v) = object.get("maxLength") {
        schema.max_length = as_integer(v, "maxLength", sink);
    }
    if let Some(v) = object.get("pattern") {
        if let Some(pattern) = v.as_str() {
            schema.pattern = compile_regex(pattern, v.location(), sink);
        }
    }

    if let Some(items_value) = object.get("items") {
        schema.items = Some(match items_value {
            KsonValue::Array(tuple, _) => ItemsSchema::Tuple(
                tuple
                    .iter()
                    .enumerate()
                    .map(|(i, v)| compile(v, own_base, indexed_pointer(&schema.pointer, "items", i), lookup, sink))
                    .collect(),
            ),
            other => ItemsSchema::Single(Box::new(compile(other, own_base, child_pointer(&schema.pointer, "items"), lookup, sink))),
        });
    }
    if let Some(v) = object.get("additionalItems") {
        schema.additional_items = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "additionalItems"), lookup, sink)));
    }
    if let Some(v) = object.get("minItems") {
        schema.min_items = as_integer(v, "minItems", sink);
    }
    if let Some(v) = object.get("maxItems") {
        schema.max_items = as_integer(v, "maxItems", sink);
    }
    schema.unique_items = object.get("uniqueItems").and_then(KsonValue::as_bool).unwrap_or(false);
    if let Some(v) = object.get("contains") {
        schema.contains = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "contains"), lookup, sink)));
    }

    if let Some(KsonValue::Object(props, _)) = object.get("properties") {
        for (key, v) in &props.properties {
            let child = compile(v, own_base, named_pointer(&schema.pointer, "properties", key.as_str()), lookup, sink);
            schema.properties.push((key.to_string(), child));
        }
    }
    if let Some(KsonValue::Object(props, _)) = object.get("patternProperties") {
        for (key, v) in &props.properties {
            match compile_regex(key.as_str(), v.location(), sink) {
                Some(re) => schema
                    .pattern_properties
                    .push((re, compile(v, own_base, child_pointer(&schema.pointer, "patternProperties"), lookup, sink))),
                None => {}
            }
        }
    }
    if let Some(v) = object.get("additionalProperties") {
        schema.additional_properties = Some(match v.as_bool() {
            Some(false) => AdditionalProperties::False,
            _ => AdditionalProperties::Schema(Box::new(compile(
                v,
                own_base,
                child_pointer(&schema.pointer, "additionalProperties"),
                lookup,
                sink,
            ))),
        });
    }
    if let Some(v) = object.get("required") {
        schema.required = as_string_list(v).unwrap_or_default();
    }
    if let Some(v) = object.get("minProperties") {
        schema.min_properties = as_integer(v, "minProperties", sink);
    }
    if let Some(v) = object.get("maxProperties") {
        schema.max_properties = as_integer(v, "maxProperties", sink);
    }
    if let Some(KsonValue::Object(deps, _)) = object.get("dependencies") {
        for (key, v) in &deps.properties {
            let dependency = match v {
                KsonValue::Array(_, _) => Dependency::PropertyNames(as_string_list(v).unwrap_or_default()),
                _ => Dependency::Schema(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "dependencies"), lookup, sink))),
            };
            schema.dependencies.push((key.to_string(), dependency));
        }
    }

    for (keyword, slot) in [("allOf", 0), ("anyOf", 1), ("oneOf", 2)] {
        if let Some(KsonValue::Array(items, _)) = object.get(keyword) {
            let compiled: Vec<JsonSchema> = items
                .iter()
                .map(|v| compile(v, own_base, child_pointer(&schema.pointer, keyword), lookup, sink))
                .collect();
            match slot {
                0 => schema.all_of = compiled,
                1 => schema.any_of = compiled,
                _ => schema.one_of = compiled,
            }
        }
    }
    if let Some(v) = object.get("not") {
        schema.not = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "not"), lookup, sink)));
    }
    if let Some(v) = object.get("if") {
        schema.if_ = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "if"), lookup, sink)));
    }
    if let Some(v) = object.get("then") {
        schema.then = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "then"), lookup, sink)));
    }
    if let Some(v) = object.get("else") {
        schema.else_ = Some(Box::new(compile(v, own_base, child_pointer(&schema.pointer, "else"), lookup, sink)));
    }

    JsonSchema::Object(Box::new(schema))
}
