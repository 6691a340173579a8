use clap::Args;
use serde::Serialize;

use prefixer::prefix::{self, FileEdit, PrefixEvent, PrefixSummary};

use super::{CmdResult, GlobalArgs, RunArgs};

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    write: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ApplyOutput {
    #[serde(rename = "prefix.apply")]
    Apply {
        root: String,
        prefix: String,
        dry_run: bool,
        summary: PrefixSummary,
        edits: Vec<FileEdit>,
        events: Vec<PrefixEvent>,
        applied: bool,
    },
}

pub fn run(args: ApplyArgs, _global: &GlobalArgs) -> CmdResult<ApplyOutput> {
    let config = args.run.resolve_config()?;
    let root = args.run.root();
    let mut plan = prefix::plan(&root, &config)?;

    if args.write {
        prefix::apply(&mut plan, &root);
    }

    let exit_code = if plan.events.has_failures() { 1 } else { 0 };

    Ok((
        ApplyOutput::Apply {
            root: plan.root,
            prefix: plan.prefix,
            dry_run: !args.write,
            summary: plan.summary,
            edits: plan.edits,
            events: plan.events.into_events(),
            applied: plan.applied,
        },
        exit_code,
    ))
}
