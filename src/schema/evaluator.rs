//! `validate(value, schema) → Vec<Message>`.
//!
//! The evaluator never short-circuits on the first failure: every keyword
//! on a schema object is checked independently and every diagnostic it
//! produces is anchored to the **value**'s location, not the schema's
//! (§4.5). `$ref` cycles are broken by a visited-set of
//! `(value offset, schema uri)` pairs, matching the intent described in
//! §5 — re-entering a cycle is treated as conformant rather than looping
//! forever.

use std::collections::HashSet;

use crate::diagnostics::{Message, MessageKind};
use crate::schema::id_lookup::SchemaIdLookup;
use crate::schema::{AdditionalProperties, Dependency, ItemsSchema, JsonSchema, SchemaObject};
use crate::value::KsonValue;

pub fn validate(value: &KsonValue, schema: &JsonSchema, lookup: &SchemaIdLookup) -> Vec<Message> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    eval(value, schema, lookup, &mut visited, &mut out);
    out
}

fn eval(
    value: &KsonValue,
    schema: &JsonSchema,
    lookup: &SchemaIdLookup,
    visited: &mut HashSet<(usize, String)>,
    out: &mut Vec<Message>,
) {
    let object = match schema {
        JsonSchema::Boolean(true) => return,
        JsonSchema::Boolean(false) => {
            out.push(Message::new(value.location(), MessageKind::NotViolation));
            return;
        }
        JsonSchema::Object(object) => object,
    };

    if let Some(uri) = &object.ref_ {
        let key = (value.location().start_offset, uri.clone());
        if !visited.insert(key) {
            return;
        }
        match crate::schema::resolve_ref(uri, lookup) {
            Some((target_value, target_pointer)) => {
                let target_schema = compile_ref_target(&target_value, target_pointer, lookup);
                eval(value, &target_schema, lookup, visited, out);
            }
            None => out.push(Message::new(value.location(), MessageKind::SchemaRefResolutionFailure { uri: uri.clone() })),
        }
        return;
    }

    eval_type(value, object, out);
    eval_enum_const(value, object, out);
    eval_numeric(value, object, out);
    eval_string(value, object, out);
    eval_array(value, object, lookup, visited, out);
    eval_object(value, object, lookup, visited, out);
    eval_combinators(value, object, lookup, visited, out);
    eval_conditional(value, object, lookup, visited, out);
}

/// A `$ref` target resolves to a raw KSON value at compile time; compile
/// it into a schema on demand rather than storing a second copy in
/// [`SchemaIdLookup`].
fn compile_ref_target(target_value: &KsonValue, pointer: crate::pointer::JsonPointer, lookup: &SchemaIdLookup) -> JsonSchema {
    let mut scratch_lookup = lookup.clone();
    let mut scratch_sink = crate::diagnostics::MessageSink::new();
    crate::schema::compile(target_value, None, pointer, &mut scratch_lookup, &mut scratch_sink)
}

fn type_name_matches(value: &KsonValue, expected: &str) -> bool {
    match expected {
        "integer" => matches!(value, KsonValue::Number(n, ..) if n.0.fract() == 0.0),
        other => value.type_name() == other,
    }
}

fn eval_type(value: &KsonValue, schema: &SchemaObject, out: &mut Vec<Message>) {
    if let Some(expected) = &schema.type_ {
        if !expected.iter().any(|t| type_name_matches(value, t)) {
            out.push(Message::new(
                value.location(),
                MessageKind::TypeMismatch { expected: expected.clone(), found: value.type_name().to_string() },
            ));
        }
    }
}

fn eval_enum_const(value: &KsonValue, schema: &SchemaObject, out: &mut Vec<Message>) {
    if let Some(members) = &schema.enum_ {
        if !members.iter().any(|m| values_equal(m, value)) {
            out.push(Message::new(value.location(), MessageKind::EnumMismatch));
        }
    }
    if let Some(expected) = &schema.const_ {
        if !values_equal(expected, value) {
            out.push(Message::new(value.location(), MessageKind::ConstMismatch));
        }
    }
}

/// Structural equality ignoring source span, used by `enum`/`const`.
fn values_equal(a: &KsonValue, b: &KsonValue) -> bool {
    match (a, b) {
        (KsonValue::Null(_), KsonValue::Null(_)) => true,
        (KsonValue::Bool(x, _), KsonValue::Bool(y, _)) => x == y,
        (KsonValue::Number(x, ..), KsonValue::Number(y, ..)) => x == y,
        (KsonValue::String(x, _), KsonValue::String(y, _)) => x == y,
        (KsonValue::Array(x, _), KsonValue::Array(y, _)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (KsonValue::Object(x, _), KsonValue::Object(y, _)) => {
            x.len() == y.len() && x.keys().all(|k| y.get(k).is_some_and(|v| values_equal(x.get(k).unwrap(), v)))
        }
        _ => false,
    }
}

fn eval_numeric(value: &KsonValue, schema: &SchemaObject, out: &mut Vec<Message>) {
    let Some(n) = value.as_f64() else { return };
    if let Some(minimum) = schema.minimum {
        if n < minimum {
            out.push(Message::new(value.location(), MessageKind::MinimumViolation { value: n, minimum }));
        }
    }
    if let Some(maximum) = schema.maximum {
        if n > maximum {
            out.push(Message::new(value.location(), MessageKind::MaximumViolation { value: n, maximum }));
        }
    }
    if let Some(minimum) = schema.exclusive_minimum {
        if n <= minimum {
            out.push(Message::new(value.location(), MessageKind::ExclusiveMinimumViolation { value: n, minimum }));
        }
    }
    if let Some(maximum) = schema.exclusive_maximum {
        if n >= maximum {
            out.push(Message::new(value.location(), MessageKind::ExclusiveMaximumViolation { value: n, maximum }));
        }
    }
    if let Some(multiple_of) = schema.multiple_of {
        if multiple_of != 0.0 {
            let quotient = n / multiple_of;
            if (quotient - quotient.round()).abs() > 1e-9 {
                out.push(Message::new(value.location(), MessageKind::MultipleOfViolation { value: n, multiple_of }));
            }
        }
    }
}

fn eval_string(value: &KsonValue, schema: &SchemaObject, out: &mut Vec<Message>) {
    let Some(s) = value.as_str() else { return };
    let len = s.chars().count() as u64;
    if let Some(min_length) = schema.min_length {
        if len < min_length {
            out.push(Message::new(value.location(), MessageKind::MinLengthViolation { min_length }));
        }
    }
    if let Some(max_length) = schema.max_length {
        if len > max_length {
            out.push(Message::new(value.location(), MessageKind::MaxLengthViolation { max_length }));
        }
    }
    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(s) {
            out.push(Message::new(value.location(), MessageKind::PatternMismatch { pattern: pattern.as_str().to_string() }));
        }
    }
}

fn eval_array(
    value: &KsonValue,
    schema: &SchemaObject,
    lookup: &SchemaIdLookup,
    visited: &mut HashSet<(usize, String)>,
    out: &mut Vec<Message>,
) {
    let Some(items) = value.as_array() else { return };
    if let Some(min_items) = schema.min_items {
        if (items.len() as u64) < min_items {
            out.push(Message::new(value.location(), MessageKind::MinItemsViolation { min_items }));
        }
    }
    if let Some(max_items) = schema.max_items {
        if (items.len() as u64) > max_items {
            out.push(Message::new(value.location(), MessageKind::MaxItemsViolation { max_items }));
        }
    }
    if schema.unique_items {
        let mut seen: Vec<&KsonValue> = Vec::new();
        for item in items {
            if seen.iter().any(|s| values_equal(s, item)) {
                out.push(Message::new(value.location(), MessageKind::UniqueItemsViolation));
                break;
            }
            seen.push(item);
        }
    }
    if let Some(contains) = &schema.contains {
        let matches = items.iter().any(|item| {
            let mut scratch = Vec::new();
            eval(item, contains, lookup, visited, &mut scratch);
            scratch.is_empty()
        });
        if !matches {
            out.push(Message::new(value.location(), MessageKind::ContainsViolation));
        }
    }
    match &schema.items {
        Some(ItemsSchema::Single(sub)) => {
            for item in items {
                eval(item, sub, lookup, visited, out);
            }
        }
        Some(ItemsSchema::Tuple(tuple)) => {
            for (index, item) in items.iter().enumerate() {
                match tuple.get(index) {
                    Some(sub) => eval(item, sub, lookup, visited, out),
                    None => match &schema.additional_items {
                        None => {}
                        Some(sub) => eval(item, sub, lookup, visited, out),
                    },
                }
            }
        }
        None => {}
    }
}

fn eval_object(
    value: &KsonValue,
    schema: &SchemaObject,
    lookup: &SchemaIdLookup,
    visited: &mut HashSet<(usize, String)>,
    out: &mut Vec<Message>,
) {
    let Some(object) = value.as_object() else { return };
    if let Some(min_properties) = schema.min_properties {
        if (object.len() as u64) < min_properties {
            out.push(Message::new(value.location(), MessageKind::MinPropertiesViolation { min_properties }));
        }
    }
    if let Some(max_properties) = schema.max_properties {
        if (object.len() as u64) > max_properties {
            out.push(Message::new(value.location(), MessageKind::MaxPropertiesViolation { max_properties }));
        }
    }
    for required in &schema.required {
        if !object.contains_key(required) {
            out.push(Message::new(value.location(), MessageKind::RequiredPropertyMissing { property: required.clone() }));
        }
    }
    for (key, child) in &object.properties {
        let mut matched_by_properties = false;
        if let Some(sub) = schema.property(key.as_str()) {
            eval(child, sub, lookup, visited, out);
            matched_by_properties = true;
        }
        let mut matched_by_pattern = false;
        for (pattern, sub) in &schema.pattern_properties {
            if pattern.is_match(key.as_str()) {
                eval(child, sub, lookup, visited, out);
                matched_by_pattern = true;
            }
        }
        if !matched_by_properties && !matched_by_pattern {
            match &schema.additional_properties {
                Some(AdditionalProperties::False) => {
                    out.push(Message::new(child.location(), MessageKind::AdditionalPropertyNotAllowed { property: key.to_string() }));
                }
                Some(AdditionalProperties::Schema(sub)) => eval(child, sub, lookup, visited, out),
                None => {}
            }
        }
    }
    for (key, dependency) in &schema.dependencies {
        if !object.contains_key(key) {
            continue;
        }
        match dependency {
            Dependency::PropertyNames(names) => {
                for name in names {
                    if !object.contains_key(name) {
                        out.push(Message::new(
                            value.location(),
                            MessageKind::DependencyMissing { property: key.clone(), requires: name.clone() },
                        ));
                    }
                }
            }
            Dependency::Schema(sub) => eval(value, sub, lookup, visited, out),
        }
    }
}

fn eval_combinators(
    value: &KsonValue,
    schema: &SchemaObject,
    lookup: &SchemaIdLookup,
    visited: &mut HashSet<(usize, String)>,
    out: &mut Vec<Message>,
) {
    for sub in &schema.all_of {
        eval(value, sub, lookup, visited, out);
    }
    if !schema.any_of.is_empty() {
        let branch_results: Vec<Vec<Message>> = schema
            .any_of
            .iter()
            .map(|sub| {
                let mut branch = Vec::new();
                eval(value, sub, lookup, visited, &mut branch);
                branch
            })
            .collect();
        if !branch_results.iter().any(Vec::is_empty) {
            out.push(Message::new(value.location(), MessageKind::AnyOfNoMatch));
            for branch in branch_results {
                out.extend(branch);
            }
        }
    }
    if !schema.one_of.is_empty() {
        let branch_results: Vec<Vec<Message>> = schema
            .one_of
            .iter()
            .map(|sub| {
                let mut branch = Vec::new();
                eval(value, sub, lookup, visited, &mut branch);
                branch
            })
            .collect();
        let matched = branch_results.iter().filter(|b| b.is_empty()).count();
        if matched == 0 {
            out.push(Message::new(value.location(), MessageKind::OneOfNoMatch));
        } else if matched > 1 {
            out.push(Message::new(value.location(), MessageKind::OneOfMultipleMatch { matched }));
        }
    }
    if let Some(not) = &schema.not {
        let mut branch = Vec::new();
        eval(value, not, lookup, visited, &mut branch);
        if branch.is_empty() {
            out.push(Message::new(value.location(), MessageKind::NotViolation));
        }
    }
}

fn eval_conditional(
    value: &KsonValue,
    schema: &SchemaObject,
    lookup: &SchemaIdLookup,
    visited: &mut HashSet<(usize, String)>,
    out: &mut Vec<Message>,
) {
    let Some(if_schema) = &schema.if_ else { return };
    let mut branch = Vec::new();
    eval(value, if_schema, lookup, visited, &mut branch);
    if branch.is_empty() {
        if let Some(then_schema) = &schema.then {
            eval(value, then_schema, lookup, visited, out);
        }
    } else if let Some(else_schema) = &schema.else_ {
        eval(value, else_schema, lookup, visited, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    fn check(schema_source: &str, value_source: &str) -> Vec<Message> {
        let (schema, lookup, sink) = parse_schema(schema_source);
        assert!(!sink.has_errors(), "{sink:?}");
        let outcome = crate::api::parse(value_source, crate::api::ParseOptions::default());
        validate(&outcome.value.unwrap(), &schema.unwrap(), &lookup)
    }

    #[test]
    fn type_mismatch_is_reported() {
        let messages = check("type: string", "42");
        assert!(messages.iter().any(|m| matches!(m.kind, MessageKind::TypeMismatch { .. })));
    }

    #[test]
    fn required_property_missing_is_reported() {
        let messages = check("type: object\nrequired: [ 'name' ]", "age: 30");
        assert!(messages.iter().any(|m| matches!(m.kind, MessageKind::RequiredPropertyMissing { .. })));
    }

    #[test]
    fn one_of_with_two_matches_is_reported() {
        let messages = check("oneOf: [ { type: number }, { minimum: 0 } ]", "5");
        assert!(messages.iter().any(|m| matches!(m.kind, MessageKind::OneOfMultipleMatch { matched: 2 })));
    }

    #[test]
    fn any_of_all_failing_reports_member_failures() {
        let messages = check("anyOf: [ { type: string }, { type: boolean } ]", "5");
        assert!(messages.iter().any(|m| matches!(m.kind, MessageKind::AnyOfNoMatch)));
        assert!(messages.iter().any(|m| matches!(m.kind, MessageKind::TypeMismatch { .. })));
    }

    #[test]
    fn passing_schema_produces_no_messages() {
        let messages = check("type: number\nminimum: 0", "5");
        assert!(messages.is_empty());
    }

    #[test]
    fn ref_ignores_sibling_keywords_during_evaluation() {
        let schema_source = "definitions: {\n  S: { type: string }\n}\nproperties: {\n  x: { $ref: '#/definitions/S', minLength: 5 }\n}";
        let messages = check(schema_source, "x: 'ab'");
        assert!(messages.iter().all(|m| !matches!(m.kind, MessageKind::MinLengthViolation { .. })));
    }
}
