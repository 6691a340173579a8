use clap::Args;
use serde::Serialize;

use prefixer::config::{self, PrefixConfig};
use prefixer::{log_status, Error};

use super::{CmdResult, GlobalArgs, RunArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Write the effective configuration to <PATH>/prefixer.json
    #[arg(long)]
    init: bool,

    /// Overwrite an existing prefixer.json when used with --init
    #[arg(long, requires = "init")]
    force: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConfigOutput {
    #[serde(rename = "config.show")]
    Show {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        config: PrefixConfig,
    },
    #[serde(rename = "config.init")]
    Init { path: String, config: PrefixConfig },
}

pub fn run(args: ConfigArgs, _global: &GlobalArgs) -> CmdResult<ConfigOutput> {
    let resolved = args.run.resolve_config()?;
    let root = args.run.root();

    if args.init {
        let target = config::config_path(&root);
        if target.exists() && !args.force {
            return Err(Error::validation_invalid_argument(
                "init",
                format!("{} already exists", target.display()),
                Some(target.display().to_string()),
            )
            .with_hint("Pass --force to overwrite it"));
        }

        let path = config::save_for_root(&root, &resolved)?;
        log_status!("config", "Wrote {}", path.display());
        return Ok((
            ConfigOutput::Init {
                path: path.display().to_string(),
                config: resolved,
            },
            0,
        ));
    }

    let source = match &args.run.config {
        Some(file) => Some(file.clone()),
        None => {
            let path = config::config_path(&root);
            path.exists().then(|| path.display().to_string())
        }
    };

    Ok((
        ConfigOutput::Show {
            source,
            config: resolved,
        },
        0,
    ))
}
