use clap::Args;
use serde::Serialize;

use prefixer::prefix::{self, AggregateRecord, PrefixEvent, PrefixSummary, RenameMap};

use super::{CmdResult, GlobalArgs, RunArgs};

#[derive(Args)]
pub struct ScanArgs {
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ScanOutput {
    #[serde(rename = "prefix.scan")]
    Scan {
        root: String,
        prefix: String,
        summary: PrefixSummary,
        aggregates: Vec<AggregateRecord>,
        mapping: RenameMap,
        events: Vec<PrefixEvent>,
    },
}

pub fn run(args: ScanArgs, _global: &GlobalArgs) -> CmdResult<ScanOutput> {
    let config = args.run.resolve_config()?;
    let plan = prefix::plan(&args.run.root(), &config)?;

    let exit_code = if plan.events.has_failures() { 1 } else { 0 };

    Ok((
        ScanOutput::Scan {
            root: plan.root,
            prefix: plan.prefix,
            summary: plan.summary,
            aggregates: plan.aggregates,
            mapping: plan.mapping,
            events: plan.events.into_events(),
        },
        exit_code,
    ))
}
