//! Declaration rewriter: rename members inside the aggregate bodies a file owns.

use regex::{Captures, Regex};

use super::lexical::full_line_comments;
use super::mapping::{AggregateMapping, RenameMap};
use crate::error::{Error, Result};

/// New lines for a file plus how many declarations were renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRewrite {
    pub lines: Vec<String>,
    pub replacements: usize,
}

struct ScopedPattern<'a> {
    mapping: &'a AggregateMapping,
    pattern: Regex,
}

/// Rewrites declaration shapes (`name;`, `name =`, `name {`, `name (`) within
/// each aggregate's own line span, using that aggregate's renames only.
pub struct DeclarationRewriter<'a> {
    scoped: Vec<ScopedPattern<'a>>,
}

/// Alternation of escaped names, longest first so overlapping names resolve
/// to the longer one.
pub(crate) fn name_alternation<'n>(names: impl Iterator<Item = &'n String>) -> String {
    let mut names: Vec<&String> = names.collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|")
}

impl<'a> DeclarationRewriter<'a> {
    pub fn new(map: &'a RenameMap) -> Result<Self> {
        let mut scoped = Vec::new();

        for mapping in &map.aggregates {
            let names = name_alternation(mapping.renames.keys());
            let pattern = Regex::new(&format!(r"\b({})(\s*[;={{(])", names)).map_err(|e| {
                Error::internal_unexpected(format!(
                    "declaration pattern for '{}': {}",
                    mapping.aggregate, e
                ))
            })?;
            scoped.push(ScopedPattern { mapping, pattern });
        }

        Ok(Self { scoped })
    }

    /// Rewrite the aggregate spans of `file`. Lines outside every span, and
    /// full-line comments inside one, are left untouched.
    pub fn rewrite(&self, file: &str, lines: &[String]) -> DeclarationRewrite {
        let comments = full_line_comments(lines);
        let mut out = lines.to_vec();
        let mut replacements = 0;

        for scoped in self.scoped.iter().filter(|s| s.mapping.file == file) {
            let first = scoped.mapping.start_line.saturating_sub(1);
            let last = scoped.mapping.end_line.min(out.len());

            for index in first..last {
                if comments[index] {
                    continue;
                }

                let mut count = 0;
                let replaced = scoped
                    .pattern
                    .replace_all(&out[index], |caps: &Captures| {
                        count += 1;
                        let new_name = scoped
                            .mapping
                            .renames
                            .get(&caps[1])
                            .map_or(&caps[1], String::as_str);
                        format!("{}{}", new_name, &caps[2])
                    })
                    .into_owned();

                if count > 0 {
                    out[index] = replaced;
                    replacements += count;
                }
            }
        }

        DeclarationRewrite {
            lines: out,
            replacements,
        }
    }
}
