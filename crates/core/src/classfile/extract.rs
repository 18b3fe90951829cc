use super::reader::ClassImage;
use crate::error::Result;
use crate::fact::Fact;
use crate::synth::FactSynthesizer;
use tracing::debug;

pub const CONSTRUCTOR: &str = "<init>";
pub const CLASS_INITIALIZER: &str = "<clinit>";

pub fn is_initializer(method_name: &str) -> bool {
    method_name == CONSTRUCTOR || method_name == CLASS_INITIALIZER
}

/// First and last line marker seen in one method body.
///
/// `last_line` tracks the last marker visited, not the largest line, and is
/// only ever set once `first_line` is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    first_line: Option<u32>,
    last_line: Option<u32>,
}

impl LineRange {
    pub fn record(&mut self, line: u32) {
        if self.first_line.is_none() {
            self.first_line = Some(line);
        } else {
            self.last_line = Some(line);
        }
    }

    pub fn first_line(&self) -> Option<u32> {
        self.first_line
    }

    pub fn last_line(&self) -> Option<u32> {
        self.last_line
    }

    pub fn is_empty(&self) -> bool {
        self.first_line.is_none()
    }

    /// Inclusive `(low, high)` bounds to draw a line from.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let first = self.first_line?;
        let last = self.last_line.unwrap_or(first);
        Some((first.min(last), first.max(last)))
    }
}

/// Walks the method table of `image` and synthesizes one fact per method
/// that carries line markers.
///
/// Constructors and class initializers are skipped, and so is every method
/// of `test_class`: the test itself must run exactly as written.
pub fn extract_facts(
    image: &ClassImage,
    class_name: &str,
    test_class: &str,
    synthesizer: &mut FactSynthesizer,
) -> Result<Vec<Fact>> {
    let mut facts = Vec::new();
    if class_name == test_class {
        debug!("Skipping methods of test class '{}'", class_name);
        return Ok(facts);
    }

    let mut current_method: Option<&str> = None;
    let mut range = LineRange::default();

    for method in image.methods() {
        let method = method?;
        if is_initializer(method.name()) {
            continue;
        }

        if let Some(previous) = current_method {
            flush(synthesizer, class_name, previous, &range, &mut facts);
        }
        range = LineRange::default();
        current_method = Some(method.name());

        for line in method.line_numbers() {
            range.record(line);
        }
    }

    if let Some(last) = current_method {
        flush(synthesizer, class_name, last, &range, &mut facts);
    }

    debug!(
        "Extracted {} facts from {} methods of '{}'",
        facts.len(),
        image.method_count(),
        class_name
    );
    Ok(facts)
}

fn flush(
    synthesizer: &mut FactSynthesizer,
    class_name: &str,
    method_name: &str,
    range: &LineRange,
    facts: &mut Vec<Fact>,
) {
    if range.is_empty() {
        return;
    }
    if let Some(fact) = synthesizer.synthesize(class_name, method_name, range) {
        facts.push(fact);
    }
}
