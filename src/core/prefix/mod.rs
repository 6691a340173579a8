//! Member prefix engine: rename struct data members to a prefixed convention
//! and propagate the new names to every recognizable usage.
//!
//! Stages, each a separate module:
//! 1. Scan declaration files for aggregate bodies and their members
//! 2. Build the rename map (a barrier: every file is scanned first)
//! 3. Rewrite declarations inside each aggregate's own span
//! 4. Rewrite usages across all usage files with the flattened map
//! 5. Write changed files back (or return a dry-run preview)

pub mod classify;
pub mod declarations;
pub mod discovery;
pub mod events;
mod lexical;
pub mod mapping;
pub mod scanner;
pub mod usages;

use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

pub use classify::{classify, LineKind};
pub use declarations::{DeclarationRewrite, DeclarationRewriter};
pub use discovery::{discover_sources, DiscoveredFile};
pub use events::{EventLog, PrefixEvent, Stage};
pub use mapping::{build_rename_map, AggregateMapping, MappingOutcome, RenameMap, SkippedRename};
pub use scanner::{AggregateRecord, ScanOutcome, Scanner, UnterminatedAggregate};
pub use usages::{UsageRewrite, UsageRewriter};

use crate::config::PrefixConfig;
use crate::error::Result;
use crate::utils::io;

// ============================================================================
// Types
// ============================================================================

/// A source file held in memory as `\n`-separated lines.
///
/// Joining the lines with `\n` reproduces the original text byte for byte,
/// including `\r` before each newline and a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File path relative to root.
    pub path: String,
    pub lines: Vec<String>,
}

impl SourceFile {
    pub fn from_text(path: impl Into<String>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.split('\n').map(String::from).collect(),
        }
    }

    pub fn extension(&self) -> &str {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }
}

/// New content for one file whose text changed.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    /// File path relative to root.
    pub file: String,
    /// Member declarations renamed inside aggregate bodies.
    pub declarations: usize,
    /// Member usages renamed anywhere in the file.
    pub usages: usize,
    #[serde(skip)]
    pub new_content: String,
}

/// Everything the pure pipeline produces for a set of in-memory sources.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub aggregates: Vec<AggregateRecord>,
    pub mapping: RenameMap,
    pub edits: Vec<FileEdit>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrefixSummary {
    pub files_scanned: usize,
    pub declaration_files: usize,
    pub aggregates: usize,
    pub renames: usize,
    pub files_changed: usize,
    pub files_written: usize,
    pub files_failed: usize,
}

/// A computed run over a directory tree, ready to preview or apply.
#[derive(Debug, Clone, Serialize)]
pub struct PrefixPlan {
    pub root: String,
    pub prefix: String,
    pub aggregates: Vec<AggregateRecord>,
    pub mapping: RenameMap,
    pub edits: Vec<FileEdit>,
    pub summary: PrefixSummary,
    pub events: EventLog,
    /// Whether edits were written to disk.
    pub applied: bool,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run scan, mapping and both rewrite phases over in-memory sources.
///
/// Scanning and rewriting run per file in parallel; results are collected in
/// input order so edits and events are deterministic.
pub fn run_pipeline(
    sources: &[SourceFile],
    config: &PrefixConfig,
    log: &mut EventLog,
) -> Result<PipelineOutput> {
    config.validate()?;
    let scanner = Scanner::new(config)?;

    let scans: Vec<Option<ScanOutcome>> = sources
        .par_iter()
        .map(|source| {
            config
                .is_declaration_extension(source.extension())
                .then(|| scanner.scan(&source.path, &source.lines))
        })
        .collect();

    let mut aggregates = Vec::new();
    for (source, outcome) in sources.iter().zip(scans) {
        let Some(outcome) = outcome else {
            continue;
        };
        for record in &outcome.records {
            log.record(PrefixEvent::AggregateFound {
                file: record.file.clone(),
                name: record.name.clone(),
                line: record.start_line,
                members: record.members.len(),
            });
        }
        for open in outcome.unterminated {
            log.record(PrefixEvent::AggregateUnterminated {
                file: source.path.clone(),
                name: open.name,
                line: open.line,
            });
        }
        aggregates.extend(outcome.records);
    }

    let MappingOutcome { map, skipped } = build_rename_map(&aggregates, &config.prefix);
    for skip in skipped {
        log.record(PrefixEvent::RenameSkipped {
            file: skip.file,
            aggregate: skip.aggregate,
            member: skip.member,
            reason: skip.reason,
        });
    }
    log.record(PrefixEvent::MappingBuilt {
        aggregates: map.aggregates.len(),
        renames: map.rename_count(),
    });

    let edits = rewrite_sources(sources, config, &map)?;
    for edit in &edits {
        log.record(PrefixEvent::FileRewritten {
            file: edit.file.clone(),
            declarations: edit.declarations,
            usages: edit.usages,
        });
    }

    Ok(PipelineOutput {
        aggregates,
        mapping: map,
        edits,
    })
}

/// Apply declaration then usage rewriting to every file. Each file's content
/// is replaced once, after both phases.
fn rewrite_sources(
    sources: &[SourceFile],
    config: &PrefixConfig,
    map: &RenameMap,
) -> Result<Vec<FileEdit>> {
    if map.is_empty() {
        return Ok(Vec::new());
    }

    let declarations = DeclarationRewriter::new(map)?;
    let usages = UsageRewriter::new(&map.flattened)?;

    let edits = sources
        .par_iter()
        .filter_map(|source| {
            let mut lines = source.lines.clone();
            let mut declared = 0;
            let mut used = 0;

            if map.for_file(&source.path).next().is_some() {
                let rewrite = declarations.rewrite(&source.path, &lines);
                declared = rewrite.replacements;
                lines = rewrite.lines;
            }

            if let Some(usages) = usages.as_ref() {
                if config.is_usage_extension(source.extension()) {
                    let rewrite = usages.rewrite(&lines);
                    used = rewrite.replacements;
                    lines = rewrite.lines;
                }
            }

            if declared + used == 0 || lines == source.lines {
                return None;
            }

            Some(FileEdit {
                file: source.path.clone(),
                declarations: declared,
                usages: used,
                new_content: lines.join("\n"),
            })
        })
        .collect();

    Ok(edits)
}

// ============================================================================
// Filesystem collaborators
// ============================================================================

/// Discover and read the sources under `root`, then run the pipeline.
///
/// Unreadable files are reported and left out; nothing is written.
pub fn plan(root: &Path, config: &PrefixConfig) -> Result<PrefixPlan> {
    config.validate()?;
    let files = discover_sources(root, config)?;
    let mut log = EventLog::new();

    let declaration_files = files
        .iter()
        .filter(|f| {
            Path::new(&f.relative)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| config.is_declaration_extension(ext))
        })
        .count();

    log.record(PrefixEvent::FilesDiscovered {
        count: files.len(),
        declaration_files,
    });

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        match io::read_file(&file.path, &format!("read {}", file.relative)) {
            Ok(text) => sources.push(SourceFile::from_text(file.relative.clone(), &text)),
            Err(e) => log.record(PrefixEvent::FileFailed {
                file: file.relative.clone(),
                stage: Stage::Read,
                reason: e.reason(),
            }),
        }
    }

    let output = run_pipeline(&sources, config, &mut log)?;

    let summary = PrefixSummary {
        files_scanned: sources.len(),
        declaration_files,
        aggregates: output.aggregates.len(),
        renames: output.mapping.rename_count(),
        files_changed: output.edits.len(),
        files_written: 0,
        files_failed: log.failed_files(Stage::Read).len(),
    };

    Ok(PrefixPlan {
        root: root.display().to_string(),
        prefix: config.prefix.clone(),
        aggregates: output.aggregates,
        mapping: output.mapping,
        edits: output.edits,
        summary,
        events: log,
        applied: false,
    })
}

/// Write every edit of `plan` back under `root`. Returns the number of files
/// written.
///
/// Each file is written independently. A failed write is reported and the
/// remaining files are still written; earlier writes are not rolled back.
pub fn apply(plan: &mut PrefixPlan, root: &Path) -> usize {
    let mut written = 0;

    for edit in &plan.edits {
        let path = root.join(&edit.file);
        match io::write_file_atomic(&path, &edit.new_content, &format!("write {}", edit.file)) {
            Ok(()) => {
                written += 1;
                plan.events.record(PrefixEvent::FileWritten {
                    file: edit.file.clone(),
                });
            }
            Err(e) => plan.events.record(PrefixEvent::FileFailed {
                file: edit.file.clone(),
                stage: Stage::Write,
                reason: e.reason(),
            }),
        }
    }

    plan.summary.files_written = written;
    plan.summary.files_failed =
        plan.events.failed_files(Stage::Read).len() + plan.events.failed_files(Stage::Write).len();
    plan.applied = true;
    written
}
