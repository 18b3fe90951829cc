//! The host execution environment receiving class images.

use crate::classfile::ClassImage;
use crate::error::{BugexError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Loaded by the host's own resolution, untouched.
    Delegated,
    /// Defined from bytes the loader resolved and re-emitted. Facts are
    /// extracted on the way unless the class is the test class.
    Defined,
}

/// A class the host has accepted.
#[derive(Debug, Clone)]
pub struct LoadedClass {
    pub name: String,
    pub origin: ClassOrigin,
    /// `None` when the host resolves the class lazily on its own.
    pub image: Option<Arc<[u8]>>,
}

pub trait ClassHost {
    /// Loads `class_name` through the host's own resolution.
    fn delegate(&mut self, class_name: &str) -> Result<LoadedClass>;

    /// Registers a rewritten image under `class_name`. Fails with
    /// `Verification` when the host rejects it.
    fn define(&mut self, class_name: &str, image: Vec<u8>) -> Result<LoadedClass>;
}

/// Checks that `image` parses and declares `class_name`.
pub fn check_definable(class_name: &str, image: &[u8]) -> Result<()> {
    let parsed = ClassImage::parse(image).map_err(|e| BugexError::Verification {
        class: class_name.to_string(),
        reason: e.to_string(),
    })?;
    let declared = parsed.class_name().map_err(|e| BugexError::Verification {
        class: class_name.to_string(),
        reason: e.to_string(),
    })?;
    if declared != class_name {
        return Err(BugexError::Verification {
            class: class_name.to_string(),
            reason: format!("wrong name: image declares '{declared}'"),
        });
    }
    Ok(())
}

/// Keeps defined classes in memory; delegation is served from a fixed set
/// of system classes.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    system: HashMap<String, Arc<[u8]>>,
    defined: BTreeMap<String, Arc<[u8]>>,
    define_attempts: usize,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_class(mut self, class_name: &str, image: Vec<u8>) -> Self {
        self.system.insert(class_name.to_string(), image.into());
        self
    }

    pub fn defined(&self) -> &BTreeMap<String, Arc<[u8]>> {
        &self.defined
    }

    pub fn define_attempts(&self) -> usize {
        self.define_attempts
    }
}

impl ClassHost for InMemoryHost {
    fn delegate(&mut self, class_name: &str) -> Result<LoadedClass> {
        let image = self
            .system
            .get(class_name)
            .cloned()
            .ok_or_else(|| BugexError::ClassNotFound(class_name.to_string()))?;
        Ok(LoadedClass {
            name: class_name.to_string(),
            origin: ClassOrigin::Delegated,
            image: Some(image),
        })
    }

    fn define(&mut self, class_name: &str, image: Vec<u8>) -> Result<LoadedClass> {
        self.define_attempts += 1;
        check_definable(class_name, &image)?;
        let image: Arc<[u8]> = image.into();
        self.defined.insert(class_name.to_string(), image.clone());
        Ok(LoadedClass {
            name: class_name.to_string(),
            origin: ClassOrigin::Defined,
            image: Some(image),
        })
    }
}
