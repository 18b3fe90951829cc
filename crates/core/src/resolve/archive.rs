use super::{ByteResolver, ClassBytes, ClassSource, class_entry_path, class_name_from_entry, is_supported_archive};
use crate::error::{BugexError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Resolves classes from an external `.jar`/`.zip` archive.
///
/// The archive is opened for each resolution and closed before returning.
#[derive(Debug, Clone)]
pub struct ArchiveResolver {
    archive: PathBuf,
}

impl ArchiveResolver {
    /// Fails with `InvalidArchive` for unsupported extensions without
    /// touching the file.
    pub fn new(archive: impl Into<PathBuf>) -> Result<Self> {
        let archive = archive.into();
        if !is_supported_archive(&archive) {
            return Err(BugexError::InvalidArchive {
                path: archive.display().to_string(),
                reason: "Archive not supported!".to_string(),
            });
        }
        Ok(Self { archive })
    }

    pub fn path(&self) -> &Path {
        &self.archive
    }
}

impl ByteResolver for ArchiveResolver {
    fn resolve(&self, class_name: &str) -> Result<ClassBytes> {
        let entry = class_entry_path(class_name);
        match read_archive_entry(&self.archive, &entry)? {
            Some(bytes) => Ok(ClassBytes {
                class_name: class_name.to_string(),
                source: ClassSource::Archive {
                    archive: self.archive.clone(),
                    entry,
                },
                bytes,
            }),
            None => Err(BugexError::ClassNotFound(class_name.to_string())),
        }
    }

    fn class_names(&self) -> Result<Vec<String>> {
        list_archive_classes(&self.archive)
    }

    fn describe(&self) -> String {
        format!("archive {}", self.archive.display())
    }
}

fn open_archive(archive: &Path) -> Result<Option<ZipArchive<File>>> {
    let file = match File::open(archive) {
        Ok(file) => file,
        Err(e) => {
            debug!("Cannot open archive {}: {}", archive.display(), e);
            return Ok(None);
        }
    };
    let zip = ZipArchive::new(file).map_err(|e| BugexError::InvalidArchive {
        path: archive.display().to_string(),
        reason: format!("unreadable archive: {e}"),
    })?;
    Ok(Some(zip))
}

/// Reads one entry, `None` when the archive or the entry is missing.
pub(crate) fn read_archive_entry(archive: &Path, entry: &str) -> Result<Option<Vec<u8>>> {
    let Some(mut zip) = open_archive(archive)? else {
        return Ok(None);
    };
    let mut file = match zip.by_name(entry) {
        Ok(file) => file,
        Err(e) => {
            debug!("No entry {} in {}: {}", entry, archive.display(), e);
            return Ok(None);
        }
    };
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

pub(crate) fn list_archive_classes(archive: &Path) -> Result<Vec<String>> {
    let Some(mut zip) = open_archive(archive)? else {
        return Err(BugexError::InvalidArchive {
            path: archive.display().to_string(),
            reason: "cannot open archive".to_string(),
        });
    };
    let mut classes = Vec::new();
    for i in 0..zip.len() {
        let entry = zip.by_index(i).map_err(|e| BugexError::InvalidArchive {
            path: archive.display().to_string(),
            reason: format!("unreadable entry #{i}: {e}"),
        })?;
        if let Some(class_name) = class_name_from_entry(entry.name()) {
            classes.push(class_name);
        }
    }
    Ok(classes)
}
