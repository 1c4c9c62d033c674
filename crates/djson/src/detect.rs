//! Classification of raw page text as JSON, JSONP, or neither.
//!
//! The detector is deliberately tolerant on the way in (leading garbage such
//! as `while(1);` anti-scraping prefixes, comments around JSONP padding) and
//! strict on the payload itself: whatever survives unwrapping must parse as
//! JSON, and the outermost value must be an object or array.

use thiserror::Error;

use crate::{comments::strip_comments, parser::parse, value::Value};

/// The result of a successful detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    /// The parsed document. Always an object or array.
    pub value: Value,
    /// The exact substring of the input that parsed as JSON, for raw
    /// re-inspection by the caller.
    pub valid_source_text: String,
    /// The JSONP wrapper function name, when the payload was wrapped.
    pub wrapper_function_name: Option<String>,
}

/// Why a piece of text was classified as not-JSON.
///
/// Every rejection is non-fatal; the caller's correct response to any of
/// these is to leave the original text alone.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NotJson {
    /// Not JSON, and there is no `(` so it cannot be JSONP either.
    #[error("no opening parenthesis")]
    NoOpeningParen,
    /// The text before the first `(` is not a plausible function reference.
    #[error("first bit not a valid function name")]
    InvalidFunctionName,
    /// There is no `)` closing the would-be function call.
    #[error("no closing paren")]
    NoClosingParen,
    /// Something other than comments/whitespace/`;` follows the last `)`.
    #[error("last closing paren followed by invalid characters")]
    TrailingContent,
    /// Shaped like a function call, but the argument is not JSON.
    #[error("looks like a function call, but the parameter is not valid JSON")]
    ParameterNotJson,
    /// Valid JSON, but a bare scalar; not worth rendering as a tree.
    #[error("technically JSON but not an object or array")]
    NotObjectOrArray,
}

/// Byte index of the first `{` or `[` in `s`, or 0 if neither occurs.
///
/// Used to discard anti-scraping prefixes before the first parse attempt.
#[must_use]
pub fn first_json_char_index(s: &str) -> usize {
    match (s.find('{'), s.find('[')) {
        (Some(obj), Some(arr)) => obj.min(arr),
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (None, None) => 0,
    }
}

/// Undoes backslash-escaping of single characters: `\x` becomes `x`.
///
/// Mirrors what the nested-JSON heuristic and "view selection as JSON"
/// feature need when JSON arrives embedded in another string literal.
#[must_use]
pub fn strip_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Classifies `raw` as JSON or JSONP and extracts the payload.
///
/// First attempts a strict parse of the text from its first `{`/`[` onward.
/// If that fails, falls back to JSONP unwrapping against the original
/// (trimmed) text: `identifier ( payload ) ;` with optional comments and
/// whitespace around the padding. The parsed outer value must be an object
/// or array; scalars are rejected.
///
/// # Errors
///
/// Returns a [`NotJson`] reason for every rejection path; parse errors from
/// the underlying JSON parser never escape.
pub fn detect(raw: &str) -> Result<ParsedPayload, NotJson> {
    let stripped = &raw[first_json_char_index(raw)..];
    let payload = match parse(stripped) {
        Ok(value) => ParsedPayload {
            value,
            valid_source_text: stripped.to_string(),
            wrapper_function_name: None,
        },
        // Not JSON; could be JSONP though. Unwrap the padding and retry
        // against the original text.
        Err(_) => detect_jsonp(raw.trim())?,
    };
    if !payload.value.is_composite() {
        return Err(NotJson::NotObjectOrArray);
    }
    Ok(payload)
}

fn detect_jsonp(text: &str) -> Result<ParsedPayload, NotJson> {
    let open = text.find('(').ok_or(NotJson::NoOpeningParen)?;

    let first_bit_stripped = strip_comments(&text[..open]);
    let first_bit = first_bit_stripped.trim();
    if !is_function_identifier(first_bit) {
        return Err(NotJson::InvalidFunctionName);
    }

    let close = text.rfind(')').ok_or(NotJson::NoClosingParen)?;
    if close < open {
        return Err(NotJson::NoClosingParen);
    }

    // After the last paren only comments, whitespace, and at most one
    // semicolon may appear.
    let last_bit_stripped = strip_comments(&text[close + 1..]);
    let last_bit = last_bit_stripped.trim();
    if !(last_bit.is_empty() || last_bit == ";") {
        return Err(NotJson::TrailingContent);
    }

    // Looks like a function call; now the argument itself decides. A parse
    // failure here is definitive, not retryable.
    let inner = &text[open + 1..close];
    let value = parse(inner).map_err(|_| NotJson::ParameterNotJson)?;
    Ok(ParsedPayload {
        value,
        valid_source_text: inner.to_string(),
        wrapper_function_name: Some(first_bit.to_string()),
    })
}

/// JS-identifier-like pattern for JSONP callbacks, allowing dotted and
/// indexed references such as `foo.bar[0]` or `obj["cb"]`.
fn is_function_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']' | '\'' | '"')
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{detect, first_json_char_index, strip_slashes, NotJson};
    use crate::value::Value;

    #[test]
    fn plain_json_round_trips() {
        let payload = detect(r#"{"a": 1}"#).unwrap();
        assert_eq!(payload.valid_source_text, r#"{"a": 1}"#);
        assert_eq!(payload.wrapper_function_name, None);
        assert!(payload.value.is_object());
    }

    #[test]
    fn strips_leading_garbage() {
        let payload = detect("while(1);{\"a\":1}").unwrap();
        assert_eq!(payload.valid_source_text, "{\"a\":1}");
        assert_eq!(payload.wrapper_function_name, None);
    }

    #[rstest]
    #[case::plain("cb", "cb({\"a\": [1, 2]});")]
    #[case::no_semicolon("cb", "cb({\"a\": [1, 2]})")]
    #[case::dotted("foo.bar[0]", "foo.bar[0]([{}, {}])")]
    #[case::dollar("$_cb123", "$_cb123({\"x\": null});")]
    #[case::commented("cb", "/* header */ cb({\"a\": 1}); // done")]
    fn jsonp_unwraps(#[case] name: &str, #[case] text: &str) {
        let payload = detect(text).unwrap();
        assert_eq!(payload.wrapper_function_name.as_deref(), Some(name));
        assert!(payload.value.is_composite());
    }

    #[test]
    fn jsonp_payload_may_contain_parens_and_brackets() {
        let payload = detect(r#"cb({"s": "a(b)c", "t": ")("});"#).unwrap();
        assert_eq!(payload.valid_source_text, r#"{"s": "a(b)c", "t": ")("}"#);
        assert_eq!(payload.wrapper_function_name.as_deref(), Some("cb"));
    }

    #[test]
    fn jsonp_at_index_zero_is_still_a_call() {
        // A paren at byte 0 means the "function name" is empty, which fails
        // the identifier check rather than being mistaken for "no paren".
        assert_eq!(detect(r#"({"a":1});"#), Err(NotJson::InvalidFunctionName));
    }

    #[rstest]
    #[case::no_paren("not json at all", NotJson::NoOpeningParen)]
    #[case::bad_name("1cb({});", NotJson::InvalidFunctionName)]
    #[case::spaced_name("a b({});", NotJson::InvalidFunctionName)]
    #[case::no_close("cb(\"x\"", NotJson::NoClosingParen)]
    #[case::close_only_in_comment("cb/*)*/(", NotJson::NoClosingParen)]
    #[case::leading_close(") then cb(", NotJson::InvalidFunctionName)]
    #[case::trailing("cb({\"a\":1}); trailing", NotJson::TrailingContent)]
    #[case::double_semicolon("cb({});;", NotJson::TrailingContent)]
    #[case::param_not_json("cb(1 + 2);", NotJson::ParameterNotJson)]
    #[case::scalar_number("42", NotJson::NotObjectOrArray)]
    #[case::scalar_string("\"just a string\"", NotJson::NotObjectOrArray)]
    #[case::scalar_bool("true", NotJson::NotObjectOrArray)]
    #[case::scalar_param("cb(42);", NotJson::NotObjectOrArray)]
    #[case::empty("", NotJson::NoOpeningParen)]
    fn rejects(#[case] text: &str, #[case] reason: NotJson) {
        assert_eq!(detect(text), Err(reason));
    }

    #[test]
    fn unclosed_padding_parses_when_prefix_strip_reveals_json() {
        // The leading-garbage strip runs first, so "cb(" falls away and the
        // remainder is strict JSON; no JSONP fallback, no wrapper name.
        let payload = detect("cb({\"a\":1}").unwrap();
        assert_eq!(payload.valid_source_text, "{\"a\":1}");
        assert_eq!(payload.wrapper_function_name, None);
    }

    #[test]
    fn scalar_behind_padding_is_rejected_as_scalar() {
        assert_eq!(detect("cb(\"str\")"), Err(NotJson::NotObjectOrArray));
    }

    #[test]
    fn reason_strings_are_stable() {
        assert_eq!(
            NotJson::NotObjectOrArray.to_string(),
            "technically JSON but not an object or array"
        );
        assert_eq!(NotJson::NoOpeningParen.to_string(), "no opening parenthesis");
        assert_eq!(
            NotJson::InvalidFunctionName.to_string(),
            "first bit not a valid function name"
        );
    }

    #[rstest]
    #[case::neither("no json here", 0)]
    #[case::object_first("xx{\"a\":[]}", 2)]
    #[case::array_first("x[1,{}]", 1)]
    #[case::object_only("ab{}", 2)]
    fn first_char_index(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(first_json_char_index(text), expected);
    }

    #[test]
    fn strip_slashes_unescapes_single_characters() {
        assert_eq!(strip_slashes(r#"{\"a\":1}"#), r#"{"a":1}"#);
        assert_eq!(strip_slashes(r"a\\b"), r"a\b");
        assert_eq!(strip_slashes("plain"), "plain");
    }

    #[test]
    fn preserves_payload_key_order() {
        let payload = detect(r#"{"z":1,"a":2}"#).unwrap();
        let Value::Object(map) = payload.value else {
            panic!("expected object")
        };
        assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["z", "a"]);
    }
}
