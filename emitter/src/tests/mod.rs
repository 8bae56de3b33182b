mod action_tests;

use proc_macro2::TokenStream;

use crate::action::Translator;
use crate::{GenerateError, Model};

/// Resolve a JSON model, panicking on loader errors.
pub(crate) fn model(json: &str) -> Model {
    Model::from_json(json).expect("test model should resolve")
}

/// Translate the root entity's action.
pub(crate) fn translate_root(model: &Model) -> Result<String, GenerateError> {
    let action = model.root().action.as_ref().expect("root should have an action");
    Translator::new(model, crate::DEFAULT_RUNTIME_CRATE).translate(action)
}

/// Normalize code through the tokenizer so comparisons ignore layout.
pub(crate) fn tokens(code: &str) -> String {
    code.parse::<TokenStream>()
        .unwrap_or_else(|e| panic!("code should tokenize: {e}\n{code}"))
        .to_string()
}

/// Assert that `code` contains `fragment`, token for token.
#[track_caller]
pub(crate) fn assert_emits(code: &str, fragment: &str) {
    let haystack = tokens(code);
    let needle = tokens(fragment);
    assert!(haystack.contains(&needle), "expected `{needle}` in:\n{haystack}");
}

#[track_caller]
pub(crate) fn assert_not_emits(code: &str, fragment: &str) {
    let haystack = tokens(code);
    let needle = tokens(fragment);
    assert!(!haystack.contains(&needle), "unexpected `{needle}` in:\n{haystack}");
}

/// Byte offset of `fragment` in the normalized `code`.
#[track_caller]
pub(crate) fn position_of(code: &str, fragment: &str) -> usize {
    let haystack = tokens(code);
    let needle = tokens(fragment);
    haystack
        .find(&needle)
        .unwrap_or_else(|| panic!("expected `{needle}` in:\n{haystack}"))
}
