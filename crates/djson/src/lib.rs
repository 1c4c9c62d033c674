//! Detection and interactive rendering of JSON/JSONP documents.
//!
//! This crate is the core of a "pretty-print raw JSON pages" viewer: given
//! arbitrary page text it decides whether the text is JSON or a
//! JSONP-wrapped call ([`detect`]), and turns the parsed value into a
//! collapsible, line-numbered HTML tree ([`render`]). The surrounding UI
//! (browser chrome, preferences, clipboard) talks to this core through the
//! message-shaped API in [`handle_text`].
//!
//! # Examples
//!
//! ```
//! use djson::{handle_text, FormatOptions, Response};
//!
//! let mut responses = Vec::new();
//! handle_text(
//!     r#"cb({"users": ["ann", "bo"]});"#,
//!     &FormatOptions::default(),
//!     |r| responses.push(r),
//! );
//! assert_eq!(responses[0], Response::Formatting);
//! match &responses[1] {
//!     Response::Formatted {
//!         valid_source_text, ..
//!     } => assert_eq!(valid_source_text, r#"{"users": ["ann", "bo"]}"#),
//!     other => panic!("unexpected response: {other:?}"),
//! }
//! ```

mod comments;
mod detect;
mod parser;
mod path;
mod pipeline;
mod render;
mod value;

pub use comments::strip_comments;
pub use detect::{detect, first_json_char_index, strip_slashes, NotJson, ParsedPayload};
pub use parser::{parse, ParseError, SyntaxError};
pub use path::{format_path, parse_path, resolve_path, PathComponent};
pub use pipeline::{format_text, handle_text, FormatOptions, Response};
pub use render::{
    build_tree, render, DisplayNode, NodeKind, NodeValue, RenderOptions, RenderTree, Rendered,
};
pub use value::{escape_string, Array, Map, Value};
