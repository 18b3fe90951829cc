use std::path::{Path, PathBuf};

/// Locates the `java` launcher, preferring `$JAVA_HOME/bin/java` over `PATH`.
pub fn find_java_binary() -> PathBuf {
    if let Ok(home) = std::env::var("JAVA_HOME") {
        if let Some(java) = check_jdk_home(Path::new(&home)) {
            return java;
        }
    }
    PathBuf::from("java")
}

fn check_jdk_home(home: &Path) -> Option<PathBuf> {
    let binary = if cfg!(windows) { "java.exe" } else { "java" };

    let java = home.join("bin").join(binary);
    if java.is_file() {
        return Some(java);
    }

    // Some JRE layouts
    let jre_java = home.join("jre").join("bin").join(binary);
    if jre_java.is_file() {
        return Some(jre_java);
    }

    None
}
