//! Shader files watched for changes on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// WGSL source loaded from a file and re-read whenever its mtime moves.
///
/// Polling happens on demand (once per frame from the compositor), so no
/// watcher thread is involved.
pub struct HotShader {
    path: PathBuf,
    modified: SystemTime,
    source: String,
}

impl HotShader {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (source, modified) = read_with_mtime(&path)?;
        log::info!("watching shader {}", path.display());

        Ok(Self {
            path,
            modified,
            source,
        })
    }

    /// Re-read the file if it changed since the last load.
    ///
    /// Returns the new source when it did. Read errors (the file is
    /// mid-save or was removed) are treated as "no change".
    pub fn poll(&mut self) -> Option<&str> {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified()).ok()?;
        if modified <= self.modified {
            return None;
        }

        match read_with_mtime(&self.path) {
            Ok((source, modified)) => {
                log::info!("shader {} changed, reloading", self.path.display());
                self.source = source;
                self.modified = modified;
                Some(&self.source)
            }
            Err(err) => {
                log::debug!("shader {} not readable yet: {err}", self.path.display());
                None
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_with_mtime(path: &Path) -> std::io::Result<(String, SystemTime)> {
    let source = fs::read_to_string(path)?;
    let modified = fs::metadata(path)?.modified()?;
    Ok((source, modified))
}

/// Run a pipeline build, turning a panic inside wgpu into `None`.
///
/// Invalid WGSL surfaces as a panic from the default error handler, which
/// would otherwise take the whole sketch down on a typo.
pub fn try_compile<T>(label: &str, build: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(build)) {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("shader '{label}' failed to compile, keeping previous version");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_shader(name: &str, source: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "scenefade-{}-{}.wgsl",
            name,
            std::process::id()
        ));
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn loads_source_from_disk() {
        let path = temp_shader("load", "// first");
        let shader = HotShader::new(&path).unwrap();
        assert_eq!(shader.source(), "// first");
        assert_eq!(shader.path(), path.as_path());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unchanged_file_is_not_reloaded() {
        let path = temp_shader("unchanged", "// same");
        let mut shader = HotShader::new(&path).unwrap();
        assert!(shader.poll().is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn removed_file_keeps_last_source() {
        let path = temp_shader("removed", "// kept");
        let mut shader = HotShader::new(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(shader.poll().is_none());
        assert_eq!(shader.source(), "// kept");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(HotShader::new("/definitely/not/here.wgsl").is_err());
    }

    #[test]
    fn try_compile_catches_panics() {
        assert_eq!(try_compile("ok", || 3), Some(3));
        let failed: Option<u32> = try_compile("broken", || panic!("bad wgsl"));
        assert_eq!(failed, None);
    }
}
