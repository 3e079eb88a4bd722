use kson::{navigate_pointer, navigate_schema, parse, parse_schema, validate_with_lookup, JsonPointer, KsonValue, MessageKind, ParseOptions};
use pretty_assertions::assert_eq;
use unindent::unindent;

// Scenario A — a two-property object, ordered, no comments.
#[test]
fn scenario_a_two_property_object() {
    let outcome = parse("name: 'John'\nage: 30", ParseOptions::default());
    assert!(!outcome.messages.has_errors());
    let value = outcome.value.unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object.get("name").and_then(KsonValue::as_str), Some("John"));
    assert_eq!(object.get("age").and_then(KsonValue::as_f64), Some(30.0));

    let ast = outcome.ast.unwrap();
    let kson::AstNode::KsonRoot { content, .. } = &ast else { panic!("expected root") };
    let kson::AstNode::ObjectDefinition { internals, .. } = content.as_deref().unwrap() else { panic!("expected object") };
    let kson::AstNode::ObjectInternals { properties, .. } = internals.as_ref() else { panic!("expected internals") };
    let name_property = &properties[0];
    let kson::AstNode::ObjectProperty { comments, .. } = name_property else { panic!("expected property") };
    assert!(comments.is_empty());
}

// Scenario B — indent-stripped embed block.
#[test]
fn scenario_b_indent_stripped_embed() {
    let source = unindent(
        "
        sql: %%sqlite
            SELECT 1
        %%
        ",
    );
    let outcome = parse(source.trim_end(), ParseOptions::default());
    assert!(!outcome.messages.has_errors(), "{:?}", outcome.messages.iter().collect::<Vec<_>>());
    let value = outcome.value.unwrap();
    let object = value.as_object().unwrap();
    let KsonValue::Embed(embed, _) = object.get("sql").unwrap() else { panic!("expected embed") };
    assert_eq!(embed.tag.as_deref(), Some("sqlite"));
    assert_eq!(embed.content.as_str(), "SELECT 1\n");
}

// Scenario C — escaped embed close delimiter.
#[test]
fn scenario_c_escaped_embed_close_delimiter() {
    let source = "sql: %%\nab %\\% cd\n%%";
    let outcome = parse(source, ParseOptions::default());
    assert!(!outcome.messages.has_errors(), "{:?}", outcome.messages.iter().collect::<Vec<_>>());
    let value = outcome.value.unwrap();
    let object = value.as_object().unwrap();
    let KsonValue::Embed(embed, _) = object.get("sql").unwrap() else { panic!("expected embed") };
    assert_eq!(embed.content.as_str(), "ab %% cd\n");
}

// String escapes decode to the character they name, not their raw source
// text.
#[test]
fn string_escapes_decode() {
    let newline_outcome = parse(r"key: '\n'", ParseOptions::default());
    assert!(!newline_outcome.messages.has_errors());
    let newline_value = newline_outcome.value.unwrap();
    assert_eq!(newline_value.as_object().unwrap().get("key").and_then(KsonValue::as_str), Some("\n"));

    let unicode_source = "key: '\\u0041'";
    let unicode_outcome = parse(unicode_source, ParseOptions::default());
    assert!(!unicode_outcome.messages.has_errors());
    let unicode_value = unicode_outcome.value.unwrap();
    assert_eq!(unicode_value.as_object().unwrap().get("key").and_then(KsonValue::as_str), Some("A"));
}

// Scenario D — a trailing comment attaches to the next node, not the
// previous one.
#[test]
fn scenario_d_trailing_comment_normalization() {
    let outcome = parse("key: 1 # hi\nother: 2", ParseOptions::default());
    assert!(!outcome.messages.has_errors());
    let ast = outcome.ast.unwrap();
    let kson::AstNode::KsonRoot { content, .. } = &ast else { panic!("expected root") };
    let kson::AstNode::ObjectDefinition { internals, .. } = content.as_deref().unwrap() else { panic!("expected object") };
    let kson::AstNode::ObjectInternals { properties, .. } = internals.as_ref() else { panic!("expected internals") };

    let kson::AstNode::ObjectProperty { comments: key_comments, .. } = &properties[0] else { panic!("expected property") };
    assert!(key_comments.is_empty());

    let kson::AstNode::ObjectProperty { comments: other_comments, .. } = &properties[1] else { panic!("expected property") };
    assert_eq!(other_comments.iter().map(|c| c.as_str()).collect::<Vec<_>>(), vec!["hi"]);
}

// Scenario E — `$ref` fully replaces sibling keywords during evaluation,
// even though the sibling is still flagged at schema-parse time.
#[test]
fn scenario_e_ref_with_sibling() {
    let schema_source = unindent(
        "
        definitions: {
          S: { type: string }
        }
        properties: {
          x: { $ref: '#/definitions/S', minLength: 5 }
        }
        ",
    );
    let schema_outcome = parse_schema(&schema_source);
    assert!(schema_outcome
        .messages
        .iter()
        .any(|m| matches!(m.kind, MessageKind::SchemaRefIgnoredProperty { .. })));

    let value_outcome = parse("x: 'ab'", ParseOptions::default());
    let messages = validate_with_lookup(&value_outcome.value.unwrap(), &schema_outcome.schema.unwrap(), &schema_outcome.lookup);
    assert!(messages.is_empty(), "{messages:?}");
}

// Scenario F — glob navigation over a value tree returns every match,
// order-independent.
#[test]
fn scenario_f_glob_navigation() {
    let source = unindent(
        "
        users: {
          alice: { email: 'a@x' }
          bob: { email: 'b@x' }
          charlie: { email: 'c@x' }
        }
        ",
    );
    let outcome = parse(&source, ParseOptions::default());
    let value = outcome.value.unwrap();
    let pointer = JsonPointer::parse_glob("/users/*/email").unwrap();
    let mut emails: Vec<&str> = navigate_pointer(&value, &pointer).into_iter().filter_map(KsonValue::as_str).collect();
    emails.sort_unstable();
    assert_eq!(emails, vec!["a@x", "b@x", "c@x"]);
}

// Gap-free tokens cover every byte of the source.
#[test]
fn gap_free_tokens_cover_every_byte() {
    let source = "name: 'John' # trailing\nage: 30 # another\n";
    let outcome = parse(source, ParseOptions { gap_free: true, ..ParseOptions::default() });
    let reassembled: String = outcome.tokens.iter().map(|t| t.text()).collect();
    assert_eq!(reassembled, source);
}

// Pointer round-trip chooses the canonical escape.
#[test]
fn pointer_round_trip_is_canonical() {
    let p = JsonPointer::parse_strict("/a~0b/c~1d").unwrap();
    assert_eq!(p.to_raw(), "/a~0b/c~1d");

    let glob = JsonPointer::parse_glob("/*/a*b").unwrap();
    assert_eq!(glob.to_raw(), "/*/a*b");
}

// Every navigator result for a glob pointer is itself matched by that
// same pointer (spot-checked against scenario F).
#[test]
fn navigator_completeness_for_globs() {
    let source = unindent(
        "
        users: {
          alice: { email: 'a@x' }
          bob: { email: 'b@x' }
        }
        ",
    );
    let outcome = parse(&source, ParseOptions::default());
    let value = outcome.value.unwrap();
    let pointer = JsonPointer::parse_glob("/users/*/email").unwrap();
    let found = navigate_pointer(&value, &pointer);
    assert_eq!(found.len(), 2);
    for name in ["alice", "bob"] {
        let exact = JsonPointer::parse_strict(&format!("/users/{name}/email")).unwrap();
        let via_exact = navigate_pointer(&value, &exact);
        assert_eq!(via_exact.len(), 1);
        assert!(found.iter().any(|v| *v == via_exact[0]));
    }
}

// No errors implies an AST, and vice versa.
#[test]
fn no_error_implies_ast_and_reverse() {
    let ok = parse("key: 'value'", ParseOptions::default());
    assert!(!ok.messages.has_errors());
    assert!(ok.ast.is_some());

    let broken = parse("key: 'unterminated", ParseOptions::default());
    assert!(broken.messages.has_errors());
    assert!(broken.ast.is_none());
}

// Schema navigation end-to-end: the sub-schema governing a nested property
// is reachable by the same pointer that would reach the matching value.
#[test]
fn navigate_schema_matches_navigate_pointer_shape() {
    let schema_source = unindent(
        "
        type: object
        properties: {
          user: {
            type: object
            properties: {
              email: { type: string, format: email }
            }
          }
        }
        ",
    );
    let schema_outcome = parse_schema(&schema_source);
    assert!(!schema_outcome.messages.has_errors());
    let schema = schema_outcome.schema.unwrap();

    let pointer = JsonPointer::parse_strict("/user/email").unwrap();
    let nodes = navigate_schema(&schema, &pointer, &schema_outcome.lookup);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].as_schema().as_object().unwrap().format.as_deref(), Some("email"));
}
