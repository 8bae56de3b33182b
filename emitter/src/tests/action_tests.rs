//! Action translation tests.
//!
//! Each test resolves a small JSON model and checks the statements emitted for
//! the root entity's action tree: control structure, assignment target and the
//! generator faults for models that cannot be translated.

use super::{assert_emits, assert_not_emits, model, position_of, tokens, translate_root};
use crate::model::{Entity, EntityId, Model, ParseAction, Property, PropertyRef, ValueType};
use crate::GenerateError;

/// `Digit` pattern leaf plus a `Number` root built from `action`.
fn number_model(properties: &str, action: &str) -> Model {
    model(&format!(
        r#"{{ "root": "Number", "entities": [
            {{ "name": "Number", "properties": [{properties}], "action": {action} }},
            {{ "name": "Digit", "virtual": true, "action": {{ "pattern": "[0-9]" }} }}
        ] }}"#
    ))
}

// ── Leaves ──

#[test]
fn test_literal_is_match_or_fail() {
    let m = number_model("", r#"{ "literal": "hello" }"#);
    assert_eq!(super::tokens(&translate_root(&m).unwrap()), super::tokens(r#"p.consume("hello")?;"#));
}

#[test]
fn test_sequence_of_literals_in_order() {
    let m = number_model(
        "",
        r#"{ "sequence": [ { "literal": "hello" }, { "literal": "world" } ] }"#,
    );
    let code = translate_root(&m).unwrap();
    assert!(position_of(&code, r#"p.consume("hello")?;"#) < position_of(&code, r#"p.consume("world")?;"#));
}

#[test]
fn test_optional_literal_uses_tolerant_form() {
    let m = number_model("", r#"{ "literal": "x", "optional": true }"#);
    let code = translate_root(&m).unwrap();
    assert_emits(&code, r#"p.maybe_consume("x");"#);
    assert_not_emits(&code, "p.maybe(|p| { p.maybe_consume(\"x\"); Ok(()) })");
}

#[test]
fn test_optional_literal_flag_assignment() {
    let m = number_model(
        r#"{ "name": "polite", "type": "<bool>" }"#,
        r#"{ "literal": "please", "optional": true, "property": "polite" }"#,
    );
    assert_emits(&translate_root(&m).unwrap(), r#"result.polite = p.maybe_consume("please");"#);
}

#[test]
fn test_optional_literal_text_assignment_is_wrapped() {
    let m = number_model(
        r#"{ "name": "sign", "type": "<string>" }"#,
        r#"{ "literal": "-", "optional": true, "property": "sign" }"#,
    );
    assert_emits(
        &translate_root(&m).unwrap(),
        r#"p.maybe(|p| { result.sign = p.consume("-")?; Ok(()) });"#,
    );
}

#[test]
fn test_extractor_reference_bypasses_routine() {
    let m = number_model(
        r#"{ "name": "first", "type": "Digit" }"#,
        r#"{ "reference": "Digit", "property": "first" }"#,
    );
    let code = translate_root(&m).unwrap();
    assert_emits(&code, "result.first = p.extract(&extracting::DIGIT)?;");
    assert_not_emits(&code, "parse_digit");
}

#[test]
fn test_plural_extractor_reference_collects() {
    // A Number is a repeat-while-succeeds over the Digit extractor.
    let m = number_model(
        r#"{ "name": "digits", "type": "Digit", "plural": true }"#,
        r#"{ "reference": "Digit", "plural": true, "property": "digits" }"#,
    );
    assert_emits(
        &translate_root(&m).unwrap(),
        "result.digits = p.many(|p| p.extract(&extracting::DIGIT));",
    );
}

#[test]
fn test_unbound_plural_leaf_is_discarded() {
    let m = number_model("", r#"{ "literal": ";", "plural": true }"#);
    assert_emits(&translate_root(&m).unwrap(), r#"p.many(|p| p.consume(";"));"#);
}

// ── References and capabilities ──

const SHAPES: &str = r#"{ "root": "Program", "entities": [
    { "name": "Program",
      "properties": [
        { "name": "header", "type": "Header" },
        { "name": "main", "type": "Shape" },
        { "name": "shapes", "type": "Shape", "plural": true },
        { "name": "figure", "type": "Figure" }
      ],
      "action": { "sequence": [
        { "reference": "Header", "property": "header" },
        { "reference": "Circle", "property": "main" },
        { "reference": "Shape", "plural": true, "property": "shapes" },
        { "reference": "Shape", "property": "figure" }
      ] } },
    { "name": "Header", "action": { "literal": "shapes:" } },
    { "name": "Figure", "virtual": true },
    { "name": "Shape", "virtual": true, "supers": ["Figure"],
      "properties": [ { "name": "alternative", "type": "Shape" } ],
      "action": { "alternation": { "label": "shape", "actions": [
        { "reference": "Circle", "property": "alternative" },
        { "reference": "Square", "property": "alternative" }
      ] } } },
    { "name": "Circle", "supers": ["Shape"], "action": { "literal": "circle" } },
    { "name": "Square", "supers": ["Shape"], "action": { "literal": "square" } }
] }"#;

#[test]
fn test_concrete_reference_is_boxed_into_option() {
    let code = translate_root(&model(SHAPES)).unwrap();
    assert_emits(&code, "result.header = Some(std::boxed::Box::new(parse_header(p)?));");
}

#[test]
fn test_concrete_reference_into_capability_field() {
    let code = translate_root(&model(SHAPES)).unwrap();
    assert_emits(
        &code,
        "result.main = Some(std::boxed::Box::new(parse_circle(p)?) as std::boxed::Box<dyn Shape>);",
    );
}

#[test]
fn test_virtual_reference_keeps_box() {
    let code = translate_root(&model(SHAPES)).unwrap();
    assert_emits(&code, "result.shapes = p.many(|p| parse_shape(p));");
}

#[test]
fn test_virtual_reference_upcasts_to_super() {
    let code = translate_root(&model(SHAPES)).unwrap();
    assert_emits(
        &code,
        "result.figure = Some(parse_shape(p)? as std::boxed::Box<dyn Figure>);",
    );
}

#[test]
fn test_virtual_owner_assigns_result_slot() {
    let m = model(SHAPES);
    let shape = m.get("Shape").unwrap();
    let action = m.entity(shape).action.as_ref().unwrap();
    let code = crate::action::Translator::new(&m, "rdgen_runtime").translate(action).unwrap();
    assert_emits(
        &code,
        "result = Some(std::boxed::Box::new(parse_circle(p)?) as std::boxed::Box<dyn Shape>);",
    );
    assert_emits(
        &code,
        "result = Some(std::boxed::Box::new(parse_square(p)?) as std::boxed::Box<dyn Shape>);",
    );
}

// ── Alternation ──

#[test]
fn test_alternation_preserves_declaration_order() {
    let m = number_model(
        "",
        r#"{ "alternation": { "label": "letter", "actions": [
            { "literal": "c" }, { "literal": "a" }, { "literal": "b" }
        ] } }"#,
    );
    let code = translate_root(&m).unwrap();
    let c = position_of(&code, r#"p.consume("c")?;"#);
    let a = position_of(&code, r#"p.consume("a")?;"#);
    let b = position_of(&code, r#"p.consume("b")?;"#);
    assert!(c < a && a < b, "branches reordered:\n{code}");
    assert_emits(&code, r#".or_fail("Expected: letter")?;"#);
    assert_emits(&code, r#"p.attempt(|p| { p.consume("c")?; Ok(()) })"#);
    assert_emits(&code, r#".or_else(|_| p.attempt(|p| { p.consume("a")?; Ok(()) }))"#);
}

#[test]
fn test_plural_alternation_is_repeated() {
    let m = number_model(
        "",
        r#"{ "alternation": { "label": "sign", "actions": [
            { "literal": "+" }, { "literal": "-" }
        ] }, "plural": true }"#,
    );
    let code = translate_root(&m).unwrap();
    assert!(super::tokens(&code).starts_with(&super::tokens("p.repeat")), "{code}");
    assert_emits(&code, r#".or_fail("Expected: sign")?; Ok(())"#);
}

#[test]
fn test_empty_alternation_always_fails() {
    let m = number_model("", r#"{ "alternation": { "label": "nothing", "actions": [] } }"#);
    assert_emits(
        &translate_root(&m).unwrap(),
        r#"std::result::Result::<(), rdgen_runtime::ParseError>::Err(p.error("Expected: nothing"))?;"#,
    );
}

// ── Accumulation ──

const PAIRS: &str = r#"{ "root": "Pairs", "entities": [
    { "name": "Pairs",
      "properties": [
        { "name": "keys", "type": "Word", "plural_parent": true },
        { "name": "values", "type": "Digit", "plural_parent": true }
      ],
      "action": { "sequence": [
        { "reference": "Word", "property": "keys" },
        { "literal": "=" },
        { "reference": "Digit", "property": "values" }
      ], "plural": true } },
    { "name": "Word", "virtual": true, "action": { "pattern": "[a-z]+" } },
    { "name": "Digit", "virtual": true, "action": { "pattern": "[0-9]" } }
] }"#;

#[test]
fn test_plural_parent_appends() {
    let code = translate_root(&model(PAIRS)).unwrap();
    assert_emits(&code, "result.keys.push(p.extract(&extracting::WORD)?);");
    assert_emits(&code, "result.values.push(p.extract(&extracting::DIGIT)?);");
    assert_not_emits(&code, "result.keys =");
}

#[test]
fn test_failed_pass_is_truncated() {
    let code = translate_root(&model(PAIRS)).unwrap();
    assert_emits(&code, "let mark = [result.keys.len(), result.values.len()];");
    assert_emits(
        &code,
        "if pass.is_err() { result.keys.truncate(mark[0]); result.values.truncate(mark[1]); } pass",
    );
}

const BINDINGS: &str = r#"{ "root": "Bindings", "entities": [
    { "name": "Bindings",
      "properties": [
        { "name": "keys", "type": "Word", "plural_parent": true },
        { "name": "values", "type": "Digit", "plural_parent": true }
      ],
      "action": { "alternation": { "label": "binding", "actions": [
        { "sequence": [
          { "reference": "Word", "property": "keys" },
          { "literal": "=" },
          { "reference": "Digit", "property": "values" }
        ] },
        { "sequence": [
          { "reference": "Word", "property": "keys" },
          { "literal": ":" },
          { "reference": "Digit", "property": "values" }
        ] }
      ] }, "plural": true } },
    { "name": "Word", "virtual": true, "action": { "pattern": "[a-z]+" } },
    { "name": "Digit", "virtual": true, "action": { "pattern": "[0-9]+" } }
] }"#;

#[test]
fn test_failed_branch_is_truncated() {
    let code = translate_root(&model(BINDINGS)).unwrap();
    let rollback = tokens(
        "if branch.is_err() { result.keys.truncate(mark[0]); result.values.truncate(mark[1]); } branch",
    );
    assert_eq!(tokens(&code).matches(&rollback).count(), 2, "{code}");
    // one mark per branch plus the one taken at pass start
    let mark = tokens("let mark = [result.keys.len(), result.values.len()];");
    assert_eq!(tokens(&code).matches(&mark).count(), 3, "{code}");
    assert!(code.contains(".or_else(|_| {"), "{code}");
}

#[test]
fn test_branch_without_accumulators_is_a_plain_attempt() {
    let m = number_model(
        "",
        r#"{ "alternation": { "label": "letter", "actions": [
            { "literal": "a" }, { "literal": "b" }
        ] } }"#,
    );
    let code = translate_root(&m).unwrap();
    assert!(!code.contains("let branch"), "{code}");
}

#[test]
fn test_plural_action_under_plural_parent_extends() {
    let m = model(
        r#"{ "root": "Rows", "entities": [
            { "name": "Rows",
              "properties": [ { "name": "cells", "type": "Digit", "plural": true, "plural_parent": true } ],
              "action": { "sequence": [
                { "reference": "Digit", "plural": true, "property": "cells" },
                { "literal": ";" }
              ], "plural": true } },
            { "name": "Digit", "virtual": true, "action": { "pattern": "[0-9]" } }
        ] }"#,
    );
    assert_emits(
        &translate_root(&m).unwrap(),
        "result.cells.extend(p.many(|p| p.extract(&extracting::DIGIT)));",
    );
}

#[test]
fn test_optional_block_with_accumulators_rolls_back() {
    let m = model(
        r#"{ "root": "List", "entities": [
            { "name": "List",
              "properties": [ { "name": "items", "type": "Digit", "plural_parent": true } ],
              "action": { "sequence": [
                { "reference": "Digit", "property": "items" },
                { "literal": "," }
              ], "optional": true } },
            { "name": "Digit", "virtual": true, "action": { "pattern": "[0-9]" } }
        ] }"#,
    );
    let code = translate_root(&m).unwrap();
    assert_emits(&code, "let mark = [result.items.len()];");
    assert_emits(&code, "result.items.truncate(mark[0]);");
    assert!(!code.contains("p.maybe("), "{code}");
}

// ── Faults ──

#[test]
fn test_plural_action_on_scalar_property() {
    let m = number_model(
        r#"{ "name": "digit", "type": "Digit" }"#,
        r#"{ "reference": "Digit", "plural": true, "property": "digit" }"#,
    );
    assert!(matches!(
        translate_root(&m),
        Err(GenerateError::PluralMismatch { ref property, .. }) if property == "digit"
    ));
}

#[test]
fn test_single_action_on_plural_property() {
    let m = number_model(
        r#"{ "name": "digits", "type": "Digit", "plural": true }"#,
        r#"{ "reference": "Digit", "property": "digits" }"#,
    );
    assert!(matches!(translate_root(&m), Err(GenerateError::PluralMismatch { .. })));
}

#[test]
fn test_accumulating_into_virtual_owner() {
    let m = model(
        r#"{ "root": "Any", "entities": [
            { "name": "Any", "virtual": true,
              "properties": [ { "name": "items", "type": "Leaf", "plural_parent": true } ],
              "action": { "reference": "Leaf", "property": "items" } },
            { "name": "Leaf", "supers": ["Any"], "action": { "literal": "x" } }
        ] }"#,
    );
    assert_eq!(
        translate_root(&m),
        Err(GenerateError::VirtualAccumulation {
            entity: "Any".to_string(),
            property: "items".to_string(),
        })
    );
}

#[test]
fn test_text_into_entity_property() {
    let m = model(
        r#"{ "root": "A", "entities": [
            { "name": "A", "properties": [ { "name": "b", "type": "B" } ],
              "action": { "literal": "b", "property": "b" } },
            { "name": "B", "action": { "literal": "b" } }
        ] }"#,
    );
    let err = translate_root(&m).unwrap_err();
    assert_eq!(err.to_string(), "`A.b` holds `B` but its action produces text");
}

#[test]
fn test_unrelated_capability_is_a_type_mismatch() {
    let m = model(
        r#"{ "root": "A", "entities": [
            { "name": "A", "properties": [ { "name": "v", "type": "V" } ],
              "action": { "reference": "B", "property": "v" } },
            { "name": "V", "virtual": true },
            { "name": "B", "action": { "literal": "b" } }
        ] }"#,
    );
    assert!(matches!(translate_root(&m), Err(GenerateError::TypeMismatch { .. })));
}

#[test]
fn test_bound_sequence_is_unassignable() {
    let m = number_model(
        r#"{ "name": "all", "type": "<string>" }"#,
        r#"{ "sequence": [ { "literal": "a" } ], "property": "all" }"#,
    );
    assert!(matches!(
        translate_root(&m),
        Err(GenerateError::UnassignableAction { kind: "sequence", .. })
    ));
}

#[test]
fn test_pattern_without_extractor() {
    let m = Model::new(
        EntityId(0),
        vec![
            Entity::new("A")
                .with_properties(vec![Property::new("b", EntityId(0), ValueType::Text)])
                .with_action(
                    ParseAction::pattern(EntityId(1), "b")
                        .bind(PropertyRef { entity: EntityId(0), index: 0 }),
                ),
            Entity::new("B").with_action(ParseAction::literal("b")),
        ],
    );
    assert_eq!(
        translate_root(&m),
        Err(GenerateError::MissingExtractor("B".to_string()))
    );
}

#[test]
fn test_reference_to_dispatch_type_without_action() {
    let m = model(
        r#"{ "root": "A", "entities": [
            { "name": "A", "action": { "reference": "Value" } },
            { "name": "Value", "virtual": true }
        ] }"#,
    );
    assert_eq!(
        translate_root(&m),
        Err(GenerateError::NoRecognitionRoutine("Value".to_string()))
    );
    assert!(m.entity(EntityId(1)).action.is_none());
}
