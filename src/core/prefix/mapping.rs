//! Rename mapping: turn scanned records into old → new name tables.

use indexmap::IndexMap;
use serde::Serialize;

use super::scanner::AggregateRecord;

/// Renames scoped to a single aggregate definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateMapping {
    pub aggregate: String,
    /// File path relative to root.
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
    pub renames: IndexMap<String, String>,
}

/// A member that kept its name, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRename {
    pub file: String,
    pub aggregate: String,
    pub member: String,
    pub reason: String,
}

/// Per-aggregate renames plus the flattened, scope-blind view used for usages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameMap {
    pub aggregates: Vec<AggregateMapping>,
    pub flattened: IndexMap<String, String>,
}

impl RenameMap {
    /// Aggregate mappings defined in `file`, in discovery order.
    pub fn for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a AggregateMapping> {
        self.aggregates.iter().filter(move |m| m.file == file)
    }

    /// Total renames across all aggregates.
    pub fn rename_count(&self) -> usize {
        self.aggregates.iter().map(|m| m.renames.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.flattened.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingOutcome {
    pub map: RenameMap,
    pub skipped: Vec<SkippedRename>,
}

/// Build the rename map from every record, in discovery order.
///
/// A member whose prefixed spelling is already declared in the same aggregate
/// is left alone and reported instead of renamed into a duplicate.
pub fn build_rename_map(records: &[AggregateRecord], prefix: &str) -> MappingOutcome {
    let mut outcome = MappingOutcome::default();

    for record in records {
        let mut renames = IndexMap::new();

        for member in &record.members {
            let new_name = format!("{}{}", prefix, member);

            if record.prefixed.contains(&new_name) {
                outcome.skipped.push(SkippedRename {
                    file: record.file.clone(),
                    aggregate: record.name.clone(),
                    member: member.clone(),
                    reason: format!("'{}' is already declared in '{}'", new_name, record.name),
                });
                continue;
            }

            outcome
                .map
                .flattened
                .entry(member.clone())
                .or_insert_with(|| new_name.clone());
            renames.insert(member.clone(), new_name);
        }

        if renames.is_empty() {
            continue;
        }

        outcome.map.aggregates.push(AggregateMapping {
            aggregate: record.name.clone(),
            file: record.file.clone(),
            start_line: record.start_line,
            end_line: record.end_line,
            renames,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, name: &str, start: usize, members: &[&str]) -> AggregateRecord {
        AggregateRecord {
            name: name.to_string(),
            file: file.to_string(),
            start_line: start,
            end_line: start + members.len() + 1,
            members: members.iter().map(|m| m.to_string()).collect(),
            prefixed: Vec::new(),
        }
    }

    #[test]
    fn prefixes_every_member_in_order() {
        let outcome = build_rename_map(&[record("a.hpp", "Point", 1, &["x", "y"])], "m_");
        let mapping = &outcome.map.aggregates[0];
        assert_eq!(mapping.aggregate, "Point");
        assert_eq!(
            mapping.renames.iter().collect::<Vec<_>>(),
            vec![
                (&"x".to_string(), &"m_x".to_string()),
                (&"y".to_string(), &"m_y".to_string())
            ]
        );
        assert_eq!(outcome.map.rename_count(), 2);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn flattened_keeps_first_discovery_order() {
        let records = [
            record("a.hpp", "A", 1, &["b", "a"]),
            record("b.hpp", "B", 1, &["a", "c"]),
        ];
        let outcome = build_rename_map(&records, "m_");
        let keys: Vec<_> = outcome.map.flattened.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(outcome.map.rename_count(), 4);
    }

    #[test]
    fn same_name_aggregates_in_different_files_stay_separate() {
        let records = [
            record("a.hpp", "Config", 1, &["width"]),
            record("b.hpp", "Config", 3, &["height"]),
        ];
        let outcome = build_rename_map(&records, "m_");
        assert_eq!(outcome.map.aggregates.len(), 2);
        assert_eq!(outcome.map.for_file("b.hpp").count(), 1);
        let b = outcome.map.for_file("b.hpp").next().unwrap();
        assert_eq!(b.start_line, 3);
        assert!(b.renames.contains_key("height"));
    }

    #[test]
    fn collision_with_existing_prefixed_name_is_skipped() {
        let mut r = record("a.hpp", "Cache", 1, &["size", "hits"]);
        r.prefixed = vec!["m_size".to_string()];
        let outcome = build_rename_map(&[r], "m_");

        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].member, "size");
        assert!(!outcome.map.flattened.contains_key("size"));
        assert_eq!(outcome.map.flattened["hits"], "m_hits");
    }

    #[test]
    fn aggregate_with_only_collisions_has_no_entry() {
        let mut r = record("a.hpp", "Cache", 1, &["size"]);
        r.prefixed = vec!["m_size".to_string()];
        let outcome = build_rename_map(&[r], "m_");
        assert!(outcome.map.aggregates.is_empty());
        assert!(outcome.map.is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let records = [
            record("a.hpp", "A", 1, &["z", "y", "x"]),
            record("b.hpp", "B", 9, &["w"]),
        ];
        assert_eq!(
            build_rename_map(&records, "m_").map,
            build_rename_map(&records, "m_").map
        );
    }
}
