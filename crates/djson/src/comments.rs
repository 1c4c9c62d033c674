//! Comment/string-aware stripping of JavaScript-style comments.
//!
//! JSONP padding is allowed to carry comments around the function call
//! (`/* callback */ foo({...}); // done`). Before the detector can validate
//! the padding, those comment spans have to be removed without disturbing
//! anything inside string or regex literals. The scanner below does exactly
//! that and nothing more; it is not a JavaScript lexer.

/// Exclusive scan modes. At most one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    SingleQuote,
    DoubleQuote,
    /// Inside a `/.../` regex literal. Tracked only so that `//` inside a
    /// regex is not misread as a line comment opener; content is preserved.
    Regex,
    BlockComment,
    LineComment,
    /// Inside an IE conditional-compilation comment (`/*@ ... @*/`). Not a
    /// true comment, so content is preserved verbatim.
    ConditionalComment,
}

/// Removes block (`/* */`) and line (`// \n`) comments from `text`.
///
/// String literals, regex literals, and conditional-compilation comments
/// (`/*@ ... @*/`) pass through untouched. A line comment is consumed
/// together with its terminating newline. Everything kept is preserved
/// byte-for-byte: the output determines whether JSONP padding is a valid
/// identifier or trailing content is empty, so it must be exact.
///
/// # Examples
///
/// ```
/// use djson::strip_comments;
///
/// assert_eq!(strip_comments("a/*b*/c//d\ne"), "ace");
/// assert_eq!(strip_comments("\"http://x\""), "\"http://x\"");
/// ```
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut mode = Mode::Code;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let prev = i.checked_sub(1).map(|p| chars[p]);
        let next = chars.get(i + 1).copied();
        match mode {
            Mode::Regex => {
                out.push(c);
                if c == '/' && prev != Some('\\') {
                    mode = Mode::Code;
                }
            }
            Mode::SingleQuote => {
                out.push(c);
                if c == '\'' && prev != Some('\\') {
                    mode = Mode::Code;
                }
            }
            Mode::DoubleQuote => {
                out.push(c);
                if c == '"' && prev != Some('\\') {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if c == '*' && next == Some('/') {
                    mode = Mode::Code;
                    i += 2;
                    continue;
                }
            }
            Mode::LineComment => {
                if matches!(c, '\n' | '\r') {
                    mode = Mode::Code;
                }
            }
            Mode::ConditionalComment => {
                out.push(c);
                if c == '/' && prev == Some('*') && i.checked_sub(2).map(|p| chars[p]) == Some('@')
                {
                    mode = Mode::Code;
                }
            }
            Mode::Code => match c {
                '"' if prev != Some('\\') => {
                    out.push(c);
                    mode = Mode::DoubleQuote;
                }
                '\'' if prev != Some('\\') => {
                    out.push(c);
                    mode = Mode::SingleQuote;
                }
                '/' if next == Some('*') && chars.get(i + 2) == Some(&'@') => {
                    out.push(c);
                    mode = Mode::ConditionalComment;
                }
                '/' if next == Some('*') => {
                    mode = Mode::BlockComment;
                    i += 2;
                    continue;
                }
                '/' if next == Some('/') => {
                    mode = Mode::LineComment;
                    i += 2;
                    continue;
                }
                '/' => {
                    out.push(c);
                    mode = Mode::Regex;
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }
    out
}
