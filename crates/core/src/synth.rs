use crate::classfile::LineRange;
use crate::explain::{ExplanationSource, PhraseBook};
use crate::fact::{Fact, FactType};
use crate::random::{RandomSource, ThreadRandom, pick_number};

/// Turns a flushed method range into a [`Fact`].
pub struct FactSynthesizer {
    random: Box<dyn RandomSource>,
    explanations: Box<dyn ExplanationSource>,
}

impl FactSynthesizer {
    pub fn new(random: Box<dyn RandomSource>, explanations: Box<dyn ExplanationSource>) -> Self {
        Self {
            random,
            explanations,
        }
    }

    pub fn with_random(random: impl RandomSource + 'static) -> Self {
        Self::new(Box::new(random), Box::new(PhraseBook))
    }

    pub fn random_mut(&mut self) -> &mut dyn RandomSource {
        self.random.as_mut()
    }

    /// Returns `None` for a range that never saw a line marker.
    pub fn synthesize(
        &mut self,
        class_name: &str,
        method_name: &str,
        range: &LineRange,
    ) -> Option<Fact> {
        let (low, high) = range.bounds()?;
        let line = pick_number(self.random.as_mut(), i64::from(low), i64::from(high)) as u32;
        let type_index = pick_number(self.random.as_mut(), 0, FactType::ALL.len() as i64 - 1);
        let fact_type = FactType::ALL[type_index as usize];
        let explanation = self
            .explanations
            .explain(class_name, method_name, self.random.as_mut());

        Some(Fact {
            class_name: class_name.to_string(),
            method_name: Some(method_name.to_string()),
            line_number: Some(line),
            explanation,
            fact_type,
        })
    }
}

impl Default for FactSynthesizer {
    fn default() -> Self {
        Self::with_random(ThreadRandom::new())
    }
}
