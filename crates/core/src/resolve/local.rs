use super::archive::{list_archive_classes, read_archive_entry};
use super::{ByteResolver, ClassBytes, ClassSource, class_entry_path, class_name_from_entry, is_supported_archive};
use crate::error::{BugexError, Result};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Environment variable holding the default resolution path.
pub const CLASSPATH_ENV: &str = "BUGEX_CLASSPATH";

/// Resolves classes along a classpath of directories and archives, first hit wins.
#[derive(Debug, Clone)]
pub struct LocalResolver {
    roots: Vec<PathBuf>,
}

impl LocalResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// An empty classpath means the working directory.
    pub fn from_classpath(classpath: &OsStr) -> Self {
        if classpath.is_empty() {
            return Self::new(vec![PathBuf::from(".")]);
        }
        Self::new(std::env::split_paths(classpath).collect())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ByteResolver for LocalResolver {
    fn resolve(&self, class_name: &str) -> Result<ClassBytes> {
        let entry = class_entry_path(class_name);
        for root in &self.roots {
            if root.is_dir() {
                let candidate = root.join(&entry);
                if candidate.is_file() {
                    return Ok(ClassBytes {
                        class_name: class_name.to_string(),
                        source: ClassSource::Directory(root.clone()),
                        bytes: std::fs::read(&candidate)?,
                    });
                }
            } else if is_supported_archive(root) {
                if let Some(bytes) = read_archive_entry(root, &entry)? {
                    return Ok(ClassBytes {
                        class_name: class_name.to_string(),
                        source: ClassSource::Archive {
                            archive: root.clone(),
                            entry,
                        },
                        bytes,
                    });
                }
            }
        }
        Err(BugexError::ClassNotFound(class_name.to_string()))
    }

    fn class_names(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut classes = Vec::new();
        for root in &self.roots {
            let found = if root.is_dir() {
                classes_in_directory(root)
            } else if is_supported_archive(root) && root.is_file() {
                list_archive_classes(root)?
            } else {
                continue;
            };
            for class_name in found {
                if seen.insert(class_name.clone()) {
                    classes.push(class_name);
                }
            }
        }
        Ok(classes)
    }

    fn describe(&self) -> String {
        let roots: Vec<String> = self
            .roots
            .iter()
            .map(|root| root.display().to_string())
            .collect();
        format!("classpath [{}]", roots.join(", "))
    }
}

fn classes_in_directory(root: &Path) -> Vec<String> {
    let mut classes = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if let Some(class_name) = class_name_from_entry(&entry_name) {
            classes.push(class_name);
        }
    }
    classes
}
