use crate::classfile::{ClassImage, extract_facts, rewrite};
use crate::error::Result;
use crate::fact::Fact;
use crate::host::{ClassHost, LoadedClass};
use crate::resolve::{ByteResolver, is_system_class};
use crate::synth::FactSynthesizer;
use std::collections::HashMap;
use tracing::{debug, info};

/// Progress of one class-load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Requested,
    Delegated,
    Resolving,
    Parsed,
    Extracted,
    Rewritten,
    Loaded,
}

/// Class loader that instruments every non-system class it resolves and
/// keeps the facts extracted along the way.
///
/// One loader serves one mock invocation; requests run one at a time.
pub struct FactExtractingLoader {
    resolver: Box<dyn ByteResolver>,
    host: Box<dyn ClassHost>,
    synthesizer: FactSynthesizer,
    test_class: String,
    facts: Vec<Fact>,
    loaded: HashMap<String, LoadedClass>,
}

impl FactExtractingLoader {
    pub fn new(
        resolver: Box<dyn ByteResolver>,
        host: Box<dyn ClassHost>,
        synthesizer: FactSynthesizer,
        test_class: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            host,
            synthesizer,
            test_class: test_class.into(),
            facts: Vec::new(),
            loaded: HashMap::new(),
        }
    }

    pub fn load_class(&mut self, class_name: &str) -> Result<LoadedClass> {
        if let Some(loaded) = self.loaded.get(class_name) {
            return Ok(loaded.clone());
        }
        trace_state(class_name, LoadState::Requested);

        let loaded = if is_system_class(class_name) {
            info!("Not instrumenting class '{}'.", class_name);
            trace_state(class_name, LoadState::Delegated);
            self.host.delegate(class_name)?
        } else {
            info!("Instrumenting class '{}'.", class_name);
            self.instrument(class_name)?
        };

        self.loaded.insert(class_name.to_string(), loaded.clone());
        Ok(loaded)
    }

    fn instrument(&mut self, class_name: &str) -> Result<LoadedClass> {
        trace_state(class_name, LoadState::Resolving);
        let found = self.resolver.resolve(class_name)?;
        debug!("Read {} bytes of '{}' from {:?}", found.bytes.len(), class_name, found.source);

        let image = ClassImage::parse(&found.bytes)?;
        trace_state(class_name, LoadState::Parsed);

        let facts = extract_facts(&image, class_name, &self.test_class, &mut self.synthesizer)?;
        trace_state(class_name, LoadState::Extracted);

        let rewritten = rewrite(&image)?;
        trace_state(class_name, LoadState::Rewritten);

        let loaded = self.host.define(class_name, rewritten)?;
        trace_state(class_name, LoadState::Loaded);

        self.facts.extend(facts);
        Ok(loaded)
    }

    /// Classes the underlying resolver can serve.
    pub fn available_classes(&self) -> Result<Vec<String>> {
        self.resolver.class_names()
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn take_facts(&mut self) -> Vec<Fact> {
        std::mem::take(&mut self.facts)
    }

    /// Keeps only the facts of `classes`, ordered as `classes` lists them.
    /// Facts of one class keep their method order.
    pub fn retain_facts_for(&mut self, classes: &[String]) {
        let mut by_class: HashMap<String, Vec<Fact>> = HashMap::new();
        for fact in self.take_facts() {
            by_class.entry(fact.class_name.clone()).or_default().push(fact);
        }
        self.facts = classes
            .iter()
            .filter_map(|class_name| by_class.remove(class_name))
            .flatten()
            .collect();
    }

    pub fn test_class(&self) -> &str {
        &self.test_class
    }

    pub fn is_loaded(&self, class_name: &str) -> bool {
        self.loaded.contains_key(class_name)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn synthesizer_mut(&mut self) -> &mut FactSynthesizer {
        &mut self.synthesizer
    }

    pub fn resolver_description(&self) -> String {
        self.resolver.describe()
    }
}

fn trace_state(class_name: &str, state: LoadState) {
    debug!("{} -> {:?}", class_name, state);
}
