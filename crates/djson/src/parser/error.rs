use thiserror::Error;

/// Error returned when input text is not valid JSON.
///
/// Carries the position of the offending character alongside the underlying
/// [`SyntaxError`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{source} at {line}:{column}")]
pub struct ParseError {
    pub(crate) source: SyntaxError,
    /// 1-based line of the error.
    pub line: usize,
    /// 1-based column of the error.
    pub column: usize,
}

impl ParseError {
    /// The underlying syntax error, without position information.
    #[must_use]
    pub fn syntax(&self) -> &SyntaxError {
        &self.source
    }
}

/// The ways a JSON document can be malformed.
#[derive(Debug, Error, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid escape character '{0}'")]
    InvalidEscapeCharacter(char),
    #[error("invalid unicode escape sequence \\u{0:04X}")]
    InvalidUnicodeEscapeSequence(u32),
    #[error("unescaped control character in string")]
    ControlCharacterInString,
    #[error("invalid number literal")]
    InvalidNumber,
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected trailing characters")]
    TrailingCharacters,
}
