use bugex_core::host::{check_definable, ClassHost, ClassOrigin, LoadedClass};
use bugex_core::resolve::class_entry_path;
use bugex_core::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host backed by a JVM process: rewritten images are written into a
/// staging directory that precedes the program on the process classpath.
/// Delegated classes are left to the JVM's own class loading.
pub struct StagingHost {
    root: PathBuf,
}

impl StagingHost {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl ClassHost for StagingHost {
    fn delegate(&mut self, class_name: &str) -> Result<LoadedClass> {
        Ok(LoadedClass {
            name: class_name.to_string(),
            origin: ClassOrigin::Delegated,
            image: None,
        })
    }

    fn define(&mut self, class_name: &str, image: Vec<u8>) -> Result<LoadedClass> {
        check_definable(class_name, &image)?;
        let path = self.root.join(class_entry_path(class_name));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &image)?;
        debug!("Staged '{}' at {}", class_name, path.display());

        Ok(LoadedClass {
            name: class_name.to_string(),
            origin: ClassOrigin::Defined,
            image: Some(image.into()),
        })
    }
}
