//! Strict JSON parser.
//!
//! A recursive-descent parser for [RFC 8259] JSON, producing a [`Value`]
//! with object key order preserved. This is the parser the detector runs on
//! each classification attempt; every failure is reported as a positioned
//! [`ParseError`] and the detector decides whether to retry with JSONP
//! unwrapping.
//!
//! [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259

mod error;

use std::{iter::Peekable, str::Chars};

pub use error::{ParseError, SyntaxError};

use crate::value::{Map, Value};

/// Containers nested deeper than this are rejected rather than risking
/// exhausting the call stack.
const MAX_DEPTH: usize = 512;

/// Parses `text` as a single JSON document.
///
/// Leading and trailing JSON whitespace (space, tab, CR, LF) is permitted;
/// anything else outside the document is an error.
///
/// # Errors
///
/// Returns a [`ParseError`] pinpointing the first offending character when
/// `text` is not valid JSON.
///
/// # Examples
///
/// ```
/// use djson::parse;
///
/// let v = parse(r#"[1, "two", null]"#).unwrap();
/// assert!(v.is_array());
/// assert!(parse("{oops}").is_err());
/// ```
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(text);
    parser.skip_whitespace();
    let value = parser.value(0)?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(value),
        Some(_) => Err(parser.error(SyntaxError::TrailingCharacters)),
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        c
    }

    fn error(&self, source: SyntaxError) -> ParseError {
        ParseError {
            source,
            line: self.line,
            column: self.column,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
    }

    /// Consumes the next character, which must be `expected`.
    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(SyntaxError::InvalidCharacter(c))),
            None => Err(self.error(SyntaxError::UnexpectedEndOfInput)),
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(self.error(SyntaxError::NestingTooDeep));
        }
        match self.peek() {
            Some('{') => self.object(depth),
            Some('[') => self.array(depth),
            Some('"') => self.string().map(Value::String),
            Some('t') => self.literal("true", Value::Boolean(true)),
            Some('f') => self.literal("false", Value::Boolean(false)),
            Some('n') => self.literal("null", Value::Null),
            Some('-' | '0'..='9') => self.number(),
            Some(c) => Err(self.error(SyntaxError::InvalidCharacter(c))),
            None => Err(self.error(SyntaxError::UnexpectedEndOfInput)),
        }
    }

    fn literal(&mut self, keyword: &'static str, value: Value) -> Result<Value, ParseError> {
        for expected in keyword.chars() {
            self.expect(expected)?;
        }
        Ok(value)
    }

    fn object(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.expect('{')?;
        let mut map = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.advance();
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_whitespace();
            let key = self.string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.value(depth + 1)?;
            // Duplicate keys: last value wins, first position kept.
            map.insert(key, value);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => {}
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => return Err(self.error(SyntaxError::InvalidCharacter(c))),
                None => return Err(self.error(SyntaxError::UnexpectedEndOfInput)),
            }
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.expect('[')?;
        let mut values = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.advance();
            return Ok(Value::Array(values));
        }
        loop {
            self.skip_whitespace();
            values.push(self.value(depth + 1)?);
            self.skip_whitespace();
            match self.advance() {
                Some(',') => {}
                Some(']') => return Ok(Value::Array(values)),
                Some(c) => return Err(self.error(SyntaxError::InvalidCharacter(c))),
                None => return Err(self.error(SyntaxError::UnexpectedEndOfInput)),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.error(SyntaxError::ControlCharacterInString));
                }
                Some(c) => out.push(c),
                None => return Err(self.error(SyntaxError::UnexpectedEndOfInput)),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        match self.advance() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.unicode_escape(),
            Some(c) => Err(self.error(SyntaxError::InvalidEscapeCharacter(c))),
            None => Err(self.error(SyntaxError::UnexpectedEndOfInput)),
        }
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.hex4()?;
        // High surrogate: a low surrogate escape must follow.
        if (0xD800..=0xDBFF).contains(&first) {
            self.expect('\\')?;
            self.expect('u')?;
            let second = self.hex4()?;
            if !(0xDC00..=0xDFFF).contains(&second) {
                return Err(self.error(SyntaxError::InvalidUnicodeEscapeSequence(second)));
            }
            let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            return char::from_u32(combined)
                .ok_or_else(|| self.error(SyntaxError::InvalidUnicodeEscapeSequence(combined)));
        }
        char::from_u32(first)
            .ok_or_else(|| self.error(SyntaxError::InvalidUnicodeEscapeSequence(first)))
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut n = 0u32;
        for _ in 0..4 {
            let c = self
                .advance()
                .ok_or_else(|| self.error(SyntaxError::UnexpectedEndOfInput))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(SyntaxError::InvalidCharacter(c)))?;
            n = n * 16 + digit;
        }
        Ok(n)
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let mut lexeme = String::new();
        if self.peek() == Some('-') {
            lexeme.push('-');
            self.advance();
        }
        // Integer part: a single zero, or a nonzero digit followed by any
        // digits. Leading zeros are not valid JSON.
        match self.peek() {
            Some('0') => {
                lexeme.push('0');
                self.advance();
            }
            Some('1'..='9') => self.digits(&mut lexeme)?,
            _ => return Err(self.error(SyntaxError::InvalidNumber)),
        }
        if self.peek() == Some('.') {
            lexeme.push('.');
            self.advance();
            self.digits(&mut lexeme)?;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            lexeme.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                lexeme.push(sign);
                self.advance();
            }
            self.digits(&mut lexeme)?;
        }
        lexeme
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| self.error(SyntaxError::InvalidNumber))
    }

    /// Appends one or more decimal digits to `lexeme`.
    fn digits(&mut self, lexeme: &mut String) -> Result<(), ParseError> {
        let mut any = false;
        while let Some(c @ '0'..='9') = self.peek() {
            lexeme.push(c);
            self.advance();
            any = true;
        }
        if any {
            Ok(())
        } else {
            Err(self.error(SyntaxError::InvalidNumber))
        }
    }
}
