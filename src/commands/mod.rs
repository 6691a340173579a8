use clap::Args;
use std::path::{Path, PathBuf};

use prefixer::config::PrefixConfig;

pub type CmdResult<T> = prefixer::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Root selection and configuration overrides shared by every command.
///
/// Precedence: command-line flags, then `--config FILE` or
/// `<PATH>/prefixer.json`, then built-in defaults.
#[derive(Args, Default, Debug, Clone)]
pub struct RunArgs {
    /// Project root containing the source directory
    #[arg(default_value = ".")]
    pub path: String,

    /// Read settings from this file instead of <PATH>/prefixer.json
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Prefix added to every member name (default: m_)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Directory under PATH to search (default: src)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<String>,

    /// Aggregate keyword to scan for; repeat for several (default: struct)
    #[arg(long = "keyword", value_name = "KEYWORD")]
    pub keywords: Vec<String>,
}

impl RunArgs {
    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// Load the file layer, then apply flag overrides and validate.
    pub fn resolve_config(&self) -> prefixer::Result<PrefixConfig> {
        let mut resolved = match &self.config {
            Some(file) => prefixer::config::load_from_file(Path::new(file))?,
            None => prefixer::config::load_for_root(&self.root())?,
        };

        if let Some(prefix) = &self.prefix {
            resolved.prefix = prefix.clone();
        }
        if let Some(source_dir) = &self.source_dir {
            resolved.source_dir = source_dir.clone();
        }
        if !self.keywords.is_empty() {
            resolved.aggregate_keywords = self.keywords.clone();
        }

        resolved.validate()?;
        Ok(resolved)
    }
}

pub mod apply;
pub mod config;
pub mod scan;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (prefixer::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Scan(args) => dispatch!(args, global, scan),
        crate::Commands::Apply(args) => dispatch!(args, global, apply),
        crate::Commands::Config(args) => dispatch!(args, global, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(path: &Path) -> RunArgs {
        RunArgs {
            path: path.display().to_string(),
            ..RunArgs::default()
        }
    }

    #[test]
    fn flags_override_file_values() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(prefixer::config::CONFIG_FILE_NAME),
            r#"{"prefix": "f_", "source_dir": "lib"}"#,
        )
        .unwrap();

        let mut run = args(dir.path());
        run.prefix = Some("m_".to_string());
        run.keywords = vec!["struct".to_string(), "class".to_string()];

        let resolved = run.resolve_config().unwrap();
        assert_eq!(resolved.prefix, "m_");
        assert_eq!(resolved.source_dir, "lib");
        assert_eq!(resolved.aggregate_keywords, vec!["struct", "class"]);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut run = args(dir.path());
        run.prefix = Some("m-".to_string());
        assert!(run.resolve_config().is_err());
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let mut run = args(dir.path());
        run.config = Some(dir.path().join("missing.json").display().to_string());
        let err = run.resolve_config().unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
