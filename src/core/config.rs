use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::io;

/// File name looked up at the run root.
pub const CONFIG_FILE_NAME: &str = "prefixer.json";

/// Settings for a prefix run. Every field can be overridden in prefixer.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixConfig {
    /// Prefix prepended to every accepted member name.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Names starting with this are treated as already following a private convention.
    #[serde(default = "default_private_prefix")]
    pub private_prefix: String,

    /// Subdirectory of the root that is searched recursively.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Extensions of files scanned for aggregate definitions.
    #[serde(default = "default_declaration_extensions")]
    pub declaration_extensions: Vec<String>,

    /// Extensions of files whose member usages are rewritten.
    #[serde(default = "default_usage_extensions")]
    pub usage_extensions: Vec<String>,

    /// Keywords that introduce an aggregate definition.
    #[serde(default = "default_aggregate_keywords")]
    pub aggregate_keywords: Vec<String>,

    #[serde(default)]
    pub skip_aggregates: Vec<String>,

    #[serde(default)]
    pub skip_members: Vec<String>,
}

impl Default for PrefixConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            private_prefix: default_private_prefix(),
            source_dir: default_source_dir(),
            declaration_extensions: default_declaration_extensions(),
            usage_extensions: default_usage_extensions(),
            aggregate_keywords: default_aggregate_keywords(),
            skip_aggregates: Vec::new(),
            skip_members: Vec::new(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_prefix() -> String {
    "m_".to_string()
}

fn default_private_prefix() -> String {
    "_".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_declaration_extensions() -> Vec<String> {
    vec!["hpp".to_string()]
}

fn default_usage_extensions() -> Vec<String> {
    vec!["cpp".to_string(), "hpp".to_string()]
}

fn default_aggregate_keywords() -> Vec<String> {
    vec!["struct".to_string()]
}

// =============================================================================
// Validation
// =============================================================================

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl PrefixConfig {
    /// Reject settings the scanner and rewriters cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.prefix) {
            return Err(Error::config_invalid_value(
                "prefix",
                Some(self.prefix.clone()),
                "prefix must be a non-empty identifier fragment (letters, digits, '_')",
            ));
        }

        if !self.private_prefix.is_empty() && !is_identifier(&self.private_prefix) {
            return Err(Error::config_invalid_value(
                "private_prefix",
                Some(self.private_prefix.clone()),
                "private_prefix must be empty or an identifier fragment",
            ));
        }

        if self.aggregate_keywords.is_empty() {
            return Err(Error::config_invalid_value(
                "aggregate_keywords",
                None,
                "at least one aggregate keyword is required",
            ));
        }

        if let Some(bad) = self.aggregate_keywords.iter().find(|k| !is_identifier(k)) {
            return Err(Error::config_invalid_value(
                "aggregate_keywords",
                Some(bad.clone()),
                format!("'{}' is not a keyword", bad),
            ));
        }

        if self.declaration_extensions.is_empty() && self.usage_extensions.is_empty() {
            return Err(Error::config_invalid_value(
                "declaration_extensions",
                None,
                "no file extensions configured",
            ));
        }

        Ok(())
    }

    pub fn is_declaration_extension(&self, ext: &str) -> bool {
        self.declaration_extensions.iter().any(|e| e == ext)
    }

    pub fn is_usage_extension(&self, ext: &str) -> bool {
        self.usage_extensions.iter().any(|e| e == ext)
    }

    /// Every extension the run cares about, deduplicated, in configuration order.
    pub fn all_extensions(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for ext in self
            .declaration_extensions
            .iter()
            .chain(self.usage_extensions.iter())
        {
            if !all.contains(ext) {
                all.push(ext.clone());
            }
        }
        all
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Path of prefixer.json for a given root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load `<root>/prefixer.json`, or built-in defaults when the file is absent.
///
/// A file that exists but does not parse is an error rather than a silent fallback,
/// since running with the wrong prefix would rewrite the whole tree.
pub fn load_for_root(root: &Path) -> Result<PrefixConfig> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(PrefixConfig::default());
    }
    load_from_file(&path)
}

/// Load an explicit config file. The file must exist.
pub fn load_from_file(path: &Path) -> Result<PrefixConfig> {
    let content = io::read_file(path, &format!("read {}", path.display()))?;

    let config: PrefixConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    config.validate()?;
    Ok(config)
}

/// Write config to `<root>/prefixer.json`, replacing any existing file.
pub fn save_for_root(root: &Path, config: &PrefixConfig) -> Result<PathBuf> {
    let path = config_path(root);

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        Error::internal_json(e.to_string(), Some(format!("serialize {}", CONFIG_FILE_NAME)))
    })?;

    io::write_file(&path, &content, &format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_header_convention() {
        let config = PrefixConfig::default();
        assert_eq!(config.prefix, "m_");
        assert_eq!(config.private_prefix, "_");
        assert_eq!(config.source_dir, "src");
        assert!(config.is_declaration_extension("hpp"));
        assert!(!config.is_declaration_extension("cpp"));
        assert!(config.is_usage_extension("cpp"));
        assert_eq!(config.all_extensions(), vec!["hpp", "cpp"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: PrefixConfig = serde_json::from_str(r#"{"prefix": "my"}"#).unwrap();
        assert_eq!(config.prefix, "my");
        assert_eq!(config.aggregate_keywords, vec!["struct"]);
        assert!(config.skip_members.is_empty());
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let config = PrefixConfig {
            prefix: String::new(),
            ..PrefixConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
        assert_eq!(err.details["key"], "prefix");
    }

    #[test]
    fn validate_rejects_non_identifier_keyword() {
        let config = PrefixConfig {
            aggregate_keywords: vec!["struct".to_string(), "class{".to_string()],
            ..PrefixConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.details["key"], "aggregate_keywords");
    }

    #[test]
    fn load_for_root_without_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_for_root(dir.path()).unwrap();
        assert_eq!(config, PrefixConfig::default());
    }

    #[test]
    fn load_for_root_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"aggregate_keywords": ["struct", "class"], "skip_members": ["x"]}"#,
        )
        .unwrap();

        let config = load_for_root(dir.path()).unwrap();
        assert_eq!(config.aggregate_keywords, vec!["struct", "class"]);
        assert_eq!(config.skip_members, vec!["x"]);
        assert_eq!(config.prefix, "m_");
    }

    #[test]
    fn load_for_root_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = load_for_root(dir.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalidJson);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = TempDir::new().unwrap();
        let config = PrefixConfig {
            prefix: "f_".to_string(),
            skip_aggregates: vec!["Vertex".to_string()],
            ..PrefixConfig::default()
        };

        let path = save_for_root(dir.path(), &config).unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));
        assert_eq!(load_for_root(dir.path()).unwrap(), config);
    }
}
