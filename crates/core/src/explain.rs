use crate::random::{RandomSource, pick_number};

/// Produces the free-text part of a fact.
pub trait ExplanationSource {
    /// Returns a non-empty explanation for a location in `class_name`.
    fn explain(
        &mut self,
        class_name: &str,
        method_name: &str,
        random: &mut dyn RandomSource,
    ) -> String;
}

const PHRASES: &[&str] = &[
    "The value computed here differs between passing and failing runs.",
    "This branch is only taken in the failing execution.",
    "A comparison at this location decides the faulty return value.",
    "The exception raised here is swallowed by the caller.",
    "This assignment overwrites a value that is read later.",
    "The loop condition evaluates differently in the failing run.",
    "The return value of this call is never checked.",
    "A boxed value is unboxed here before the comparison.",
    "This location executes more often than in passing runs.",
    "The state of this object is inconsistent after this statement.",
];

/// Picks one of a fixed list of phrases.
#[derive(Debug, Default, Clone)]
pub struct PhraseBook;

impl ExplanationSource for PhraseBook {
    fn explain(
        &mut self,
        _class_name: &str,
        _method_name: &str,
        random: &mut dyn RandomSource,
    ) -> String {
        let index = pick_number(random, 0, PHRASES.len() as i64 - 1) as usize;
        PHRASES[index].to_string()
    }
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedExplanation(pub String);

impl ExplanationSource for FixedExplanation {
    fn explain(
        &mut self,
        _class_name: &str,
        _method_name: &str,
        _random: &mut dyn RandomSource,
    ) -> String {
        if self.0.is_empty() {
            return PHRASES[0].to_string();
        }
        self.0.clone()
    }
}
