//! Splitting a raw input line into an argument vector.
//!
//! The grammar here is deliberately small: space and tab delimit tokens,
//! runs of delimiters collapse, and a trailing `&` marks the line for
//! background execution. There is no quoting or substitution.

/// The parsed form of one input line: the command and its arguments as
/// independently owned tokens, plus the background-execution flag.
///
/// An empty `argv` is a valid no-op (blank input), never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector {
    /// Tokens in order of appearance. Never contains empty strings or
    /// embedded whitespace.
    pub argv: Vec<String>,
    /// Set when the line ended with `&` (outside any token).
    pub background: bool,
    /// The trimmed input line as typed, kept for history and job listings.
    pub line: String,
}

impl ArgumentVector {
    /// First token, i.e. the command name, if the line was not blank.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Every token after the command name.
    pub fn tail(&self) -> Vec<&str> {
        self.argv.iter().skip(1).map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// Tokenize one input line, accepting at most `max_line` characters.
///
/// Anything past `max_line` is dropped silently. A `&` that is the last
/// non-whitespace character sets the background flag and is removed; when
/// it directly terminates a token (`sleep 100&`) only that token is
/// truncated. A `&` anywhere else is ordinary token text.
pub fn split_line(line: &str, max_line: usize) -> ArgumentVector {
    let line = match line.char_indices().nth(max_line) {
        Some((cut, _)) => &line[..cut],
        None => line,
    };

    let trimmed = line.trim();
    let (body, background) = match trimmed.strip_suffix('&') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    let argv = body
        .split([' ', '\t'])
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    ArgumentVector {
        argv,
        background,
        line: trimmed.to_string(),
    }
}
