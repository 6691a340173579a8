//! Usage rewriter: apply the flattened map to member accesses in any file.
//!
//! Two rules, both scope-blind:
//! 1. Qualified access, `obj.name` or `ptr->name`, where the left side ends
//!    in an identifier.
//! 2. Bare reference right after `return` or one of `= ( , { < > + - * /`.
//!
//! Full-line comments are skipped. Literals and trailing comments are not.

use indexmap::IndexMap;
use regex::{Captures, Regex};

use super::declarations::name_alternation;
use super::lexical::{full_line_comments, preceded_by_identifier};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRewrite {
    pub lines: Vec<String>,
    pub replacements: usize,
}

pub struct UsageRewriter<'a> {
    renames: &'a IndexMap<String, String>,
    qualified: Regex,
    contextual: Regex,
}

impl<'a> UsageRewriter<'a> {
    /// Returns `None` when there is nothing to rename.
    pub fn new(renames: &'a IndexMap<String, String>) -> Result<Option<Self>> {
        if renames.is_empty() {
            return Ok(None);
        }

        let names = name_alternation(renames.keys());
        let build = |pattern: String| {
            Regex::new(&pattern)
                .map_err(|e| Error::internal_unexpected(format!("usage pattern: {}", e)))
        };

        Ok(Some(Self {
            renames,
            qualified: build(format!(r"(\.|->)({})\b", names))?,
            contextual: build(format!(r"(\breturn\s+|[=(,{{<>+\-*/]\s*)({})\b", names))?,
        }))
    }

    fn renamed<'c>(&'c self, old: &'c str) -> &'c str {
        self.renames.get(old).map_or(old, String::as_str)
    }

    /// Rewrite one line, returning the new text and the number of renames.
    pub fn rewrite_line(&self, line: &str) -> (String, usize) {
        let mut count = 0;

        let qualified = self
            .qualified
            .replace_all(line, |caps: &Captures| {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                if !preceded_by_identifier(line, whole.start) {
                    return caps[0].to_string();
                }
                count += 1;
                format!("{}{}", &caps[1], self.renamed(&caps[2]))
            })
            .into_owned();

        let contextual = self
            .contextual
            .replace_all(&qualified, |caps: &Captures| {
                count += 1;
                format!("{}{}", &caps[1], self.renamed(&caps[2]))
            })
            .into_owned();

        (contextual, count)
    }

    /// Rewrite every non-comment line of a file.
    pub fn rewrite(&self, lines: &[String]) -> UsageRewrite {
        let comments = full_line_comments(lines);
        let mut replacements = 0;

        let lines = lines
            .iter()
            .zip(comments)
            .map(|(line, is_comment)| {
                if is_comment {
                    return line.clone();
                }
                let (new_line, count) = self.rewrite_line(line);
                replacements += count;
                new_line
            })
            .collect();

        UsageRewrite {
            lines,
            replacements,
        }
    }
}
