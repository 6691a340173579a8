//! Member classification: decide what a single aggregate-body statement is.
//!
//! The scanner hands over statements that start at body depth 1, already
//! stripped of comments and literal contents. Classification is purely
//! lexical. Precedence: noise, access marker, nested type, other keyword,
//! function, data member.

use regex::Regex;
use std::sync::LazyLock;

/// What a statement inside an aggregate body is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Blank, comment, preprocessor residue, or lone braces/semicolons.
    Noise,
    /// `public:`, `private:`, `protected:`.
    AccessMarker,
    /// A nested struct/class/union/enum definition.
    NestedType,
    /// Anything with a parameter list and a terminator or body.
    Function,
    /// A data member declaration, carrying the declared name.
    DataMember(String),
    /// Declarations that are not data members (aliases, statics, friends, ...).
    Other,
}

/// Data-member shape: type tokens (optionally `::`-qualified, with one
/// angle-bracket group, separated by whitespace or pointer/reference marks),
/// then the member name, then `;`, `=` or `{`.
static DATA_MEMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][\w:]*(?:\s*<[^;={}]*>)?[\s*&]+)+([A-Za-z_]\w*)\s*(?:;|=|\{)")
        .expect("data member pattern is valid")
});

static ACCESS_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:public|private|protected)\s*:").expect("access marker pattern is valid")
});

static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[\[[^\]]*\]\]\s*)+").expect("attribute pattern is valid")
});

const TYPE_INTRODUCERS: &[&str] = &["struct", "class", "union", "enum"];

/// Leading keywords that never start a non-static data member.
const NON_MEMBER_KEYWORDS: &[&str] = &[
    "using",
    "typedef",
    "friend",
    "static",
    "template",
    "static_assert",
    "extern",
    "constexpr",
    "inline",
    "thread_local",
    "namespace",
    "return",
];

/// C and C++ reserved words. A candidate member name in this list is a
/// misparse, never a member.
pub const RESERVED_WORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char",
    "char16_t", "char32_t", "char8_t", "class", "const", "const_cast", "consteval",
    "constexpr", "constinit", "continue", "decltype", "default", "delete", "do", "double",
    "dynamic_cast", "else", "enum", "explicit", "export", "extern", "false", "float", "for",
    "friend", "goto", "if", "inline", "int", "long", "mutable", "namespace", "new",
    "noexcept", "not", "nullptr", "operator", "or", "override", "final", "private",
    "protected", "public", "register", "reinterpret_cast", "requires", "return", "short",
    "signed", "sizeof", "static", "static_assert", "static_cast", "struct", "switch",
    "template", "this", "thread_local", "throw", "true", "try", "typedef", "typeid",
    "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t",
    "while", "xor",
];

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

fn first_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_noise(text: &str) -> bool {
    text.is_empty()
        || text.starts_with("//")
        || text.starts_with("/*")
        || text.starts_with('*')
        || text.starts_with('#')
        || text.chars().all(|c| matches!(c, '{' | '}' | ';') || c.is_whitespace())
}

/// A parameter list paired with a statement terminator or a body opener.
fn looks_like_function(text: &str) -> bool {
    text.contains('(') && (text.contains(';') || text.contains('{'))
}

/// Match the data-member shape and return the declared name.
fn data_member_name(text: &str) -> Option<String> {
    let caps = DATA_MEMBER_PATTERN.captures(text)?;
    let name = caps.get(1)?.as_str();
    if is_reserved_word(name) {
        return None;
    }
    Some(name.to_string())
}

/// Classify one statement from an aggregate body.
pub fn classify(statement: &str) -> LineKind {
    let text = statement.trim();
    if is_noise(text) {
        return LineKind::Noise;
    }

    if let Some(marker) = ACCESS_MARKER_PATTERN.find(text) {
        let rest = &text[marker.end()..];
        if !rest.starts_with(':') {
            let rest = rest.trim();
            return if rest.is_empty() {
                LineKind::AccessMarker
            } else {
                classify(rest)
            };
        }
    }

    let text = match ATTRIBUTE_PATTERN.find(text) {
        Some(attrs) => text[attrs.end()..].trim_start(),
        None => text,
    };

    let word = first_word(text);
    if TYPE_INTRODUCERS.contains(&word) {
        return classify_elaborated(text);
    }

    if NON_MEMBER_KEYWORDS.contains(&word) {
        return LineKind::Other;
    }

    if looks_like_function(text) {
        return LineKind::Function;
    }

    match data_member_name(text) {
        Some(name) => LineKind::DataMember(name),
        None => LineKind::Other,
    }
}

/// A statement starting with `struct`/`class`/`union`/`enum` is a nested type
/// definition when it carries a body (or its body is still to come). A plain
/// `struct Node* next;` is a data member with an elaborated type.
fn classify_elaborated(text: &str) -> LineKind {
    if text.contains('{') || !text.ends_with(';') {
        return LineKind::NestedType;
    }

    let mut rest = text;
    while TYPE_INTRODUCERS.contains(&first_word(rest)) {
        rest = rest[first_word(rest).len()..].trim_start();
    }

    if looks_like_function(rest) {
        return LineKind::Function;
    }

    match data_member_name(rest) {
        Some(name) => LineKind::DataMember(name),
        None => LineKind::Other,
    }
}
