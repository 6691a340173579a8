//! Source file discovery beneath `<root>/<source_dir>`.

use std::path::{Path, PathBuf};

use crate::config::PrefixConfig;
use crate::error::{Error, Result};

/// A file found under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path relative to the run root, used as the file's identity.
    pub relative: String,
    pub path: PathBuf,
}

/// Enumerate every file with a configured extension, sorted by relative path.
pub fn discover_sources(root: &Path, config: &PrefixConfig) -> Result<Vec<DiscoveredFile>> {
    if !root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "path",
            format!("Root directory not found: {}", root.display()),
            Some(root.display().to_string()),
        ));
    }

    let source_root = root.join(&config.source_dir);
    if !source_root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "source_dir",
            format!("Source directory not found: {}", source_root.display()),
            Some(config.source_dir.clone()),
        ));
    }

    let base = glob::Pattern::escape(&source_root.to_string_lossy());
    let mut files: Vec<DiscoveredFile> = Vec::new();

    for ext in config.all_extensions() {
        let pattern = format!("{}/**/*.{}", base, glob::Pattern::escape(&ext));
        let entries = glob::glob(&pattern).map_err(|e| {
            Error::validation_invalid_argument(
                "extensions",
                format!("Invalid glob pattern '{}': {}", pattern, e),
                Some(ext.clone()),
            )
        })?;

        for path in entries.filter_map(|entry| entry.ok()).filter(|p| p.is_file()) {
            let relative = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            files.push(DiscoveredFile { relative, path });
        }
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    files.dedup_by(|a, b| a.relative == b.relative);
    Ok(files)
}
