//! Structural scanner: locate aggregate bodies and collect their data members.
//!
//! An explicit state machine over brace depth. Outside an aggregate the
//! scanner only looks for introduction lines. Once a body is open, text that
//! starts at depth 1 is cut into statements and handed to the classifier;
//! anything deeper (function bodies, nested types, brace initializers) is
//! skipped until depth returns to 1.

use regex::Regex;
use serde::Serialize;

use super::classify::{classify, is_reserved_word, LineKind};
use super::lexical::sanitize_lines;
use crate::config::PrefixConfig;
use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// One located aggregate body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRecord {
    pub name: String,
    /// File path relative to root.
    pub file: String,
    /// Line containing the introducing keyword (1-indexed).
    pub start_line: usize,
    /// Line containing the matching closing brace (1-indexed).
    pub end_line: usize,
    /// Accepted member names in discovery order.
    pub members: Vec<String>,
    /// Names in the body rejected because they already carry a prefix.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefixed: Vec<String>,
}

/// An aggregate whose body never closed before end of file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnterminatedAggregate {
    pub name: String,
    /// Line containing the introducing keyword (1-indexed).
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub records: Vec<AggregateRecord>,
    pub unterminated: Vec<UnterminatedAggregate>,
}

/// Where the search for an aggregate's opening brace ended.
enum BodyStart {
    Open { line: usize, col: usize },
    NotABody,
}

/// Where the body walk ended.
enum BodyEnd {
    Closed { line: usize },
    Unterminated,
}

// ============================================================================
// Scanner
// ============================================================================

/// Alignment and packing specifiers allowed between the keyword and the name:
/// `alignas(16)`, `__attribute__((packed))`, `__declspec(align(16))`,
/// `[[nodiscard]]`. One level of nested parentheses is accepted.
const LAYOUT_SPECIFIER: &str = r"(?:(?:alignas|__declspec)\s*\((?:[^()]|\([^()]*\))*\)|__attribute__\s*\(\((?:[^()]|\([^()]*\))*\)\)|\[\[[^\]]*\]\])";

pub struct Scanner {
    intro: Regex,
    prefix: String,
    private_prefix: String,
    skip_aggregates: Vec<String>,
    skip_members: Vec<String>,
}

impl Scanner {
    pub fn new(config: &PrefixConfig) -> Result<Self> {
        let keywords = config
            .aggregate_keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = format!(
            r"^(?:typedef\s+)?(?:{})\s+(?:{}\s*)*([A-Za-z_]\w*)",
            keywords, LAYOUT_SPECIFIER
        );
        let intro = Regex::new(&pattern).map_err(|e| {
            Error::config_invalid_value(
                "aggregate_keywords",
                Some(config.aggregate_keywords.join(",")),
                format!("cannot build introduction pattern: {}", e),
            )
        })?;

        Ok(Self {
            intro,
            prefix: config.prefix.clone(),
            private_prefix: config.private_prefix.clone(),
            skip_aggregates: config.skip_aggregates.clone(),
            skip_members: config.skip_members.clone(),
        })
    }

    /// Scan one file's lines for aggregate definitions.
    pub fn scan(&self, file: &str, lines: &[String]) -> ScanOutcome {
        let code = sanitize_lines(lines);
        let mut outcome = ScanOutcome::default();
        let mut line = 0;

        while line < code.len() {
            let text = &code[line];
            let trimmed = text.trim_start();
            let Some(caps) = self.intro.captures(trimmed) else {
                line += 1;
                continue;
            };

            let name = caps[1].to_string();
            let after_name = (text.len() - trimmed.len()) + caps.get(0).map_or(0, |m| m.end());

            let (open_line, open_col) = match find_body_start(&code, line, after_name) {
                BodyStart::Open { line, col } => (line, col),
                BodyStart::NotABody => {
                    line += 1;
                    continue;
                }
            };

            let mut body = BodyCollector::default();
            match body.walk(&code, open_line, open_col + 1) {
                BodyEnd::Closed { line: close_line } => {
                    if let Some(record) = self.finish_record(file, &name, line, close_line, body) {
                        outcome.records.push(record);
                    }
                    line = close_line + 1;
                }
                BodyEnd::Unterminated => {
                    outcome.unterminated.push(UnterminatedAggregate {
                        name,
                        line: line + 1,
                    });
                    break;
                }
            }
        }

        outcome
    }

    fn finish_record(
        &self,
        file: &str,
        name: &str,
        start: usize,
        end: usize,
        body: BodyCollector,
    ) -> Option<AggregateRecord> {
        if self.skip_aggregates.iter().any(|s| s == name) {
            return None;
        }

        let mut members: Vec<String> = Vec::new();
        let mut prefixed: Vec<String> = Vec::new();

        for candidate in body.candidates {
            if is_reserved_word(&candidate) || self.skip_members.contains(&candidate) {
                continue;
            }
            if self.is_prefixed(&candidate) {
                if !prefixed.contains(&candidate) {
                    prefixed.push(candidate);
                }
                continue;
            }
            if !members.contains(&candidate) {
                members.push(candidate);
            }
        }

        if members.is_empty() {
            return None;
        }

        Some(AggregateRecord {
            name: name.to_string(),
            file: file.to_string(),
            start_line: start + 1,
            end_line: end + 1,
            members,
            prefixed,
        })
    }

    fn is_prefixed(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            || (!self.private_prefix.is_empty() && name.starts_with(&self.private_prefix))
    }
}

// ============================================================================
// State machine pieces
// ============================================================================

/// Find the `{` that opens the body, starting right after the aggregate name.
///
/// `;` before the brace means a forward or variable declaration; `(`, `)` or
/// `=` mean the keyword was part of a function signature or an initialized
/// variable. Either way there is no body to scan.
fn find_body_start(code: &[String], start_line: usize, start_col: usize) -> BodyStart {
    for (line, text) in code.iter().enumerate().skip(start_line) {
        let from = if line == start_line { start_col } else { 0 };
        for (col, c) in text.char_indices().skip_while(|(i, _)| *i < from) {
            match c {
                '{' => return BodyStart::Open { line, col },
                ';' | '(' | ')' | '=' => return BodyStart::NotABody,
                _ => {}
            }
        }
    }
    BodyStart::NotABody
}

/// Walks a body from just after its opening brace, cutting depth-1 text into
/// statements and classifying each one.
#[derive(Default)]
struct BodyCollector {
    depth: usize,
    statement: String,
    candidates: Vec<String>,
}

impl BodyCollector {
    fn walk(&mut self, code: &[String], open_line: usize, start_col: usize) -> BodyEnd {
        self.depth = 1;

        for (line, text) in code.iter().enumerate().skip(open_line) {
            let from = if line == open_line { start_col } else { 0 };
            for (_, c) in text.char_indices().skip_while(|(i, _)| *i < from) {
                match c {
                    '{' => {
                        if self.depth == 1 {
                            self.statement.push('{');
                        }
                        self.depth += 1;
                    }
                    '}' => {
                        self.depth -= 1;
                        match self.depth {
                            0 => {
                                self.flush();
                                return BodyEnd::Closed { line };
                            }
                            1 => {
                                self.statement.push('}');
                                self.flush();
                            }
                            _ => {}
                        }
                    }
                    ';' if self.depth == 1 => {
                        self.statement.push(';');
                        self.flush();
                    }
                    _ if self.depth == 1 => self.statement.push(c),
                    _ => {}
                }
            }

            if self.depth == 1 && !self.statement.trim().is_empty() {
                if is_complete_invocation(&self.statement) {
                    self.flush();
                } else {
                    self.statement.push(' ');
                }
            }
        }

        BodyEnd::Unterminated
    }

    fn flush(&mut self) {
        if let LineKind::DataMember(name) = classify(&self.statement) {
            self.candidates.push(name);
        }
        self.statement.clear();
    }
}

/// Pending text that ends a line as a closed call-like group, such as a
/// `Q_PROPERTY(...)` macro or a constructor head, is a statement of its own
/// even without a `;`. Text with `=` or `{` is still being continued.
fn is_complete_invocation(statement: &str) -> bool {
    let text = statement.trim_end();
    if !text.ends_with(')') || text.contains('=') || text.contains('{') {
        return false;
    }

    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(String::from).collect()
    }

    fn scan_with(config: &PrefixConfig, text: &str) -> ScanOutcome {
        Scanner::new(config).unwrap().scan("src/Types.hpp", &lines(text))
    }

    fn scan(text: &str) -> ScanOutcome {
        scan_with(&PrefixConfig::default(), text)
    }

    #[test]
    fn single_line_body() {
        let outcome = scan("struct Point { int x; int y; };");
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.name, "Point");
        assert_eq!(record.members, vec!["x", "y"]);
        assert_eq!((record.start_line, record.end_line), (1, 1));
    }

    #[test]
    fn multi_line_body_with_brace_on_next_line() {
        let outcome = scan("struct Vertex\n{\n    glm::vec3 pos;\n    glm::vec2 uv{};\n};\n");
        let record = &outcome.records[0];
        assert_eq!(record.members, vec!["pos", "uv"]);
        assert_eq!((record.start_line, record.end_line), (1, 5));
        assert_eq!(record.file, "src/Types.hpp");
    }

    #[test]
    fn function_bodies_are_skipped() {
        let text = "\
struct Widget {
    std::string name = \"a\";
    int size() const {
        int local = 0;
        return local;
    }
    void reset()
    {
        int other;
    }
    bool visible;
};";
        let outcome = scan(text);
        assert_eq!(outcome.records[0].members, vec!["name", "visible"]);
    }

    #[test]
    fn nested_types_are_not_recorded() {
        let text = "\
struct Outer {
    struct Inner {
        int hidden;
    };
    enum class Mode { A, B };
    Inner inner;
};";
        let outcome = scan(text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Outer");
        assert_eq!(outcome.records[0].members, vec!["inner"]);
        assert_eq!(outcome.records[0].end_line, 7);
    }

    #[test]
    fn already_prefixed_names_are_excluded() {
        let outcome = scan("struct Counter {\n    int m_count;\n    int _cache;\n    int total;\n};");
        let record = &outcome.records[0];
        assert_eq!(record.members, vec!["total"]);
        assert_eq!(record.prefixed, vec!["m_count", "_cache"]);
    }

    #[test]
    fn method_only_struct_yields_no_record() {
        let outcome = scan("struct Ops {\n    void run();\n    int count() const;\n};");
        assert!(outcome.records.is_empty());
        assert!(outcome.unterminated.is_empty());
    }

    #[test]
    fn forward_declarations_and_signatures_are_ignored() {
        let text = "\
struct Forward;
struct Point make_point(int a);
struct Point origin = {0, 0};
struct Real { int v; };";
        let outcome = scan(text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Real");
        assert_eq!(outcome.records[0].start_line, 4);
    }

    #[test]
    fn comments_and_literals_do_not_confuse_depth() {
        let text = "\
struct Text {
    // int commented;
    /* } */
    std::string open = \"{\";
    char close = '}';
    int after;
};";
        let outcome = scan(text);
        assert_eq!(outcome.records[0].members, vec!["open", "close", "after"]);
    }

    #[test]
    fn access_markers_and_multi_declaration_lines() {
        let text = "\
struct Mixed {
public:
    int a; int b;
private: float c;
};";
        assert_eq!(scan(text).records[0].members, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let outcome = scan("struct Dup {\n    int v;\n    int v;\n};");
        assert_eq!(outcome.records[0].members, vec!["v"]);
    }

    #[test]
    fn unterminated_aggregate_stops_scan() {
        let text = "struct Open {\n    int a;\n\nstruct Later { int b; };";
        let outcome = scan(text);
        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.unterminated,
            vec![UnterminatedAggregate {
                name: "Open".to_string(),
                line: 1
            }]
        );
    }

    #[test]
    fn several_aggregates_in_order() {
        let text = "struct A { int a; };\n\ntypedef struct B {\n    int b;\n} B;\nstruct C { int c; };";
        let names: Vec<_> = scan(text).records.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn class_keyword_only_when_configured() {
        let text = "class Camera {\npublic:\n    float fov;\n};";
        assert!(scan(text).records.is_empty());

        let config = PrefixConfig {
            aggregate_keywords: vec!["struct".to_string(), "class".to_string()],
            ..PrefixConfig::default()
        };
        assert_eq!(scan_with(&config, text).records[0].members, vec!["fov"]);
    }

    #[test]
    fn skip_lists_are_honored() {
        let config = PrefixConfig {
            skip_aggregates: vec!["Raw".to_string()],
            skip_members: vec!["id".to_string()],
            ..PrefixConfig::default()
        };
        let text = "struct Raw { int a; };\nstruct Entity { int id; int hp; };";
        let outcome = scan_with(&config, text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].members, vec!["hp"]);
    }

    #[test]
    fn macro_line_without_semicolon_ends_its_statement() {
        let text = "\
struct Widget {
    Q_PROPERTY(int width READ width)
    int width;
    int height;
};";
        assert_eq!(scan(text).records[0].members, vec!["width", "height"]);
    }

    #[test]
    fn constructor_head_and_initializer_list_are_not_members() {
        let text = "\
struct Span {
    Span(int a, int b)
        : first(a), last(b)
    {}
    int first;
    int last = compute(0,
                       1);
};";
        assert_eq!(scan(text).records[0].members, vec!["first"]);
    }

    #[test]
    fn digit_separator_does_not_swallow_next_member() {
        let text = "struct Limits {\n    int big = 1'000;\n    int other;\n};";
        assert_eq!(scan(text).records[0].members, vec!["big", "other"]);
    }

    #[test]
    fn layout_specifiers_before_the_name() {
        let text = "\
struct alignas(16) GpuSceneData {
    glm::mat4 view;
    glm::vec4 ambient;
};
struct __attribute__((packed)) Header {
    uint8_t tag;
};
struct __attribute__((aligned(8))) [[nodiscard]] Token { int kind; };";
        let outcome = scan(text);
        let found: Vec<_> = outcome
            .records
            .iter()
            .map(|r| (r.name.as_str(), r.members.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("GpuSceneData", vec!["view".to_string(), "ambient".to_string()]),
                ("Header", vec!["tag".to_string()]),
                ("Token", vec!["kind".to_string()]),
            ]
        );
        assert_eq!(outcome.records[0].start_line, 1);
    }

    #[test]
    fn layout_specifier_does_not_hide_signatures() {
        let text = "struct alignas(8) Pair make_pair(int a);\nstruct Real { int v; };";
        let outcome = scan(text);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Real");
    }

    #[test]
    fn preprocessor_lines_are_ignored() {
        let text = "struct Cfg {\n#if DEBUG\n    int level;\n#endif\n    int mode;\n};";
        assert_eq!(scan(text).records[0].members, vec!["level", "mode"]);
    }
}
