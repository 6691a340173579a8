//! Structured progress events emitted while a run proceeds.

use serde::Serialize;
use std::fmt;

/// Which file operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PrefixEvent {
    FilesDiscovered {
        count: usize,
        declaration_files: usize,
    },
    AggregateFound {
        file: String,
        name: String,
        line: usize,
        members: usize,
    },
    AggregateUnterminated {
        file: String,
        name: String,
        line: usize,
    },
    RenameSkipped {
        file: String,
        aggregate: String,
        member: String,
        reason: String,
    },
    MappingBuilt {
        aggregates: usize,
        renames: usize,
    },
    FileRewritten {
        file: String,
        declarations: usize,
        usages: usize,
    },
    FileWritten {
        file: String,
    },
    FileFailed {
        file: String,
        stage: Stage,
        reason: String,
    },
}

impl fmt::Display for PrefixEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixEvent::FilesDiscovered {
                count,
                declaration_files,
            } => write!(
                f,
                "Found {} source files ({} scanned for declarations)",
                count, declaration_files
            ),
            PrefixEvent::AggregateFound {
                file,
                name,
                line,
                members,
            } => write!(f, "{}:{} struct {} ({} members)", file, line, name, members),
            PrefixEvent::AggregateUnterminated { file, name, line } => {
                write!(f, "{}:{} struct {} never closes, skipping rest of file", file, line, name)
            }
            PrefixEvent::RenameSkipped {
                aggregate,
                member,
                reason,
                ..
            } => write!(f, "Keeping {}::{}: {}", aggregate, member, reason),
            PrefixEvent::MappingBuilt {
                aggregates,
                renames,
            } => write!(f, "Mapped {} members across {} structs", renames, aggregates),
            PrefixEvent::FileRewritten {
                file,
                declarations,
                usages,
            } => write!(
                f,
                "{}: {} declarations, {} usages",
                file, declarations, usages
            ),
            PrefixEvent::FileWritten { file } => write!(f, "Updated {}", file),
            PrefixEvent::FileFailed {
                file,
                stage,
                reason,
            } => {
                let verb = match stage {
                    Stage::Read => "read",
                    Stage::Write => "write",
                };
                write!(f, "Failed to {} {}: {}", verb, file, reason)
            }
        }
    }
}

impl PrefixEvent {
    /// File-scoped failures: a file that could not be read or written, or an
    /// aggregate left open at end of file.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PrefixEvent::FileFailed { .. } | PrefixEvent::AggregateUnterminated { .. }
        )
    }
}

/// Ordered event sink. Every recorded event is also logged to stderr.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<PrefixEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: PrefixEvent) {
        log_status!("prefix", "{}", event);
        self.events.push(event);
    }

    pub fn events(&self) -> &[PrefixEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PrefixEvent> {
        self.events
    }

    pub fn has_failures(&self) -> bool {
        self.events.iter().any(PrefixEvent::is_failure)
    }

    /// Files that failed to read or write, in event order.
    pub fn failed_files(&self, stage: Stage) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PrefixEvent::FileFailed { file, stage: s, .. } if *s == stage => {
                    Some(file.as_str())
                }
                _ => None,
            })
            .collect()
    }
}
