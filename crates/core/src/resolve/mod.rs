//! Resolution strategies locating the raw bytes of a class.
//!
//! Both strategies share the same name-to-entry mapping (`a.b.C` is stored
//! as `a/b/C.class`) and feed the same extraction pipeline.

mod archive;
mod local;

pub use archive::ArchiveResolver;
pub use local::{CLASSPATH_ENV, LocalResolver};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Class-name prefixes that are never instrumented.
pub const RECOGNIZED_PREFIXES: &[&str] = &[
    "java.",
    "javax.",
    "sun.",
    "jdk.",
    "org.junit.",
    "junit.framework",
    "org.hamcrest.",
];

pub fn is_system_class(class_name: &str) -> bool {
    RECOGNIZED_PREFIXES
        .iter()
        .any(|prefix| class_name.starts_with(prefix))
}

/// Archive kinds accepted as external input (`.jar`, `.zip`).
pub fn is_supported_archive(path: &Path) -> bool {
    let name = path.to_string_lossy();
    name.ends_with(".jar") || name.ends_with(".zip")
}

/// `a.b.C` -> `a/b/C.class`
pub fn class_entry_path(class_name: &str) -> String {
    class_name.replace('.', "/") + ".class"
}

/// `a/b/C.class` -> `a.b.C`, ignoring metadata entries.
pub fn class_name_from_entry(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(".class")?;
    if stem.is_empty() || stem.starts_with("META-INF/") {
        return None;
    }
    let base = stem.rsplit('/').next().unwrap_or(stem);
    if base == "module-info" || base == "package-info" {
        return None;
    }
    Some(stem.replace('/', "."))
}

/// Where the bytes of a class were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSource {
    Directory(PathBuf),
    Archive { archive: PathBuf, entry: String },
}

/// Raw class bytes together with the request they answer.
#[derive(Debug, Clone)]
pub struct ClassBytes {
    pub class_name: String,
    pub source: ClassSource,
    pub bytes: Vec<u8>,
}

pub trait ByteResolver {
    /// Locates the bytes of `class_name`, failing with `ClassNotFound`.
    fn resolve(&self, class_name: &str) -> Result<ClassBytes>;

    /// All classes this resolver can serve, in lookup order.
    fn class_names(&self) -> Result<Vec<String>>;

    fn describe(&self) -> String;
}
