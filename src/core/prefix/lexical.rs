//! Line-level lexical helpers shared by the scanner and the rewriters.
//!
//! Nothing here tokenizes C++. The helpers only know enough to blank out
//! comments, string/char literal contents and preprocessor directives so that
//! brace counting and statement splitting see code.

/// Lexical state carried from one line to the next.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LexState {
    /// Inside a `/* ... */` block that started on an earlier line.
    pub in_block_comment: bool,
    /// Inside a preprocessor directive continued with a trailing backslash.
    pub in_directive: bool,
}

impl LexState {
    /// Whether `line` is a comment as a whole: it starts inside a block
    /// comment, or its first non-blank characters open one (`//`, `/*`).
    pub fn is_full_line_comment(&self, line: &str) -> bool {
        if self.in_block_comment {
            return true;
        }
        let trimmed = line.trim_start();
        trimmed.starts_with("//") || trimmed.starts_with("/*")
    }

    /// Return `line` with comment text, literal contents and preprocessor
    /// directives replaced by spaces, advancing the state past the line.
    ///
    /// Quotes are kept so literals stay visible as `"   "`. The result has
    /// the same number of chars as the input.
    pub fn sanitize(&mut self, line: &str) -> String {
        let chars: Vec<char> = line.chars().collect();

        if self.in_directive || (!self.in_block_comment && line.trim_start().starts_with('#')) {
            self.in_directive = line.trim_end().ends_with('\\');
            return " ".repeat(chars.len());
        }

        let mut out = String::with_capacity(line.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.in_block_comment {
                if c == '*' && next == Some('/') {
                    self.in_block_comment = false;
                    out.push_str("  ");
                    i += 2;
                } else {
                    out.push(' ');
                    i += 1;
                }
                continue;
            }

            match (c, next) {
                ('/', Some('/')) => {
                    out.extend(std::iter::repeat(' ').take(chars.len() - i));
                    break;
                }
                ('/', Some('*')) => {
                    self.in_block_comment = true;
                    out.push_str("  ");
                    i += 2;
                }
                ('\'', _) if is_digit_separator(&chars, i) => {
                    out.push(c);
                    i += 1;
                }
                ('"', _) | ('\'', _) => {
                    out.push(c);
                    i += 1;
                    while i < chars.len() {
                        let d = chars[i];
                        if d == '\\' {
                            let consumed = if i + 1 < chars.len() { 2 } else { 1 };
                            out.extend(std::iter::repeat(' ').take(consumed));
                            i += consumed;
                            continue;
                        }
                        i += 1;
                        if d == c {
                            out.push(c);
                            break;
                        }
                        out.push(' ');
                    }
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        out
    }
}

/// A `'` inside a numeric literal (`1'000`, `0xFF'FF`). The word before it
/// starts with a digit; `L'a'` and `u8'a'` stay character literals.
fn is_digit_separator(chars: &[char], pos: usize) -> bool {
    let mut start = pos;
    while start > 0 && (chars[start - 1].is_ascii_alphanumeric() || chars[start - 1] == '_') {
        start -= 1;
    }
    start < pos && chars[start].is_ascii_digit()
}

/// For each line, whether it is a full-line comment (see [`LexState::is_full_line_comment`]).
pub fn full_line_comments(lines: &[String]) -> Vec<bool> {
    let mut state = LexState::default();
    lines
        .iter()
        .map(|line| {
            let is_comment = state.is_full_line_comment(line);
            state.sanitize(line);
            is_comment
        })
        .collect()
}

/// Sanitize every line of a file, carrying state across lines.
pub fn sanitize_lines(lines: &[String]) -> Vec<String> {
    let mut state = LexState::default();
    lines.iter().map(|line| state.sanitize(line)).collect()
}

/// Whether the text ending at byte `pos` of `text` is an identifier
/// (a word that does not start with a digit).
pub fn preceded_by_identifier(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    let mut start = pos;
    while start > 0 && is_word_byte(bytes[start - 1]) {
        start -= 1;
    }
    start < pos && !bytes[start].is_ascii_digit()
}

pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
