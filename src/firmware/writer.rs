//! All-or-nothing output writing.
//!
//! Every file is first written to a hidden temp file next to its target.
//! Only once all of them are on disk are they renamed into place, so a
//! failed run never leaves a partial set of outputs behind.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Generated files, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    /// `(file name, content)` pairs
    pub files: Vec<(String, String)>,
}

impl OutputBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a file.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((name.into(), content.into()));
        self
    }

    /// Content of the file called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, content)| content.as_str())
    }

    /// Writes every file into `dir`, creating it if needed.
    ///
    /// Returns the final paths in write order. On error, staged temp files
    /// are removed and no target file has been replaced unless the failure
    /// happened during the final renames.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(self.files.len());
        for (name, content) in &self.files {
            let target = dir.join(name);
            let temp = dir.join(format!(".{name}.tmp"));
            if let Err(err) = fs::write(&temp, content) {
                let _ = fs::remove_file(&temp);
                discard(&staged);
                return Err(err).with_context(|| format!("Failed to write temp file: {}", temp.display()));
            }
            staged.push((temp, target));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (index, (temp, target)) in staged.iter().enumerate() {
            if let Err(err) = fs::rename(temp, target) {
                discard(&staged[index..]);
                return Err(err)
                    .with_context(|| format!("Failed to rename temp file to: {}", target.display()));
            }
            tracing::info!(path = %target.display(), "Wrote output file");
            written.push(target.clone());
        }

        Ok(written)
    }
}

/// Removes staged temp files, ignoring ones that are already gone.
fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        if let Err(err) = fs::remove_file(temp) {
            tracing::debug!(path = %temp.display(), error = %err, "Could not remove temp file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bundle() -> OutputBundle {
        OutputBundle::new()
            .with_file("keymap.c", "// keymap\n")
            .with_file("config.h", "#pragma once\n")
            .with_file("rules.mk", "VIAL_ENABLE = yes\n")
    }

    #[test]
    fn test_write_all_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");

        let written = bundle().write_all(&out).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written[0], out.join("keymap.c"));
        assert_eq!(fs::read_to_string(out.join("config.h")).unwrap(), "#pragma once\n");
        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_all_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("rules.mk"), "old").unwrap();

        bundle().write_all(temp_dir.path()).unwrap();

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("rules.mk")).unwrap(),
            "VIAL_ENABLE = yes\n"
        );
    }

    #[test]
    fn test_failed_stage_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the second temp file should go makes its write fail.
        fs::create_dir(temp_dir.path().join(".config.h.tmp")).unwrap();

        let result = bundle().write_all(temp_dir.path());

        assert!(result.is_err());
        assert!(!temp_dir.path().join("keymap.c").exists());
        assert!(!temp_dir.path().join(".keymap.c.tmp").exists());
        assert!(!temp_dir.path().join("config.h").exists());
    }

    #[test]
    fn test_get() {
        let bundle = bundle();
        assert_eq!(bundle.get("config.h"), Some("#pragma once\n"));
        assert_eq!(bundle.get("missing"), None);
    }
}
