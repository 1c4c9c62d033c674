//! Rendering of a parsed [`Value`] into collapsible HTML markup.
//!
//! Rendering happens in two passes. [`build_tree`] walks the value
//! depth-first and produces an immutable [`DisplayNode`] tree, assigning
//! pre-order line numbers and collecting the set of distinct child counts
//! along the way. [`RenderTree::to_markup`] then serializes that tree into
//! the markup the content script wires interactivity onto. Keeping the
//! passes separate lets tests compare trees instead of markup strings.
//!
//! The markup contract, which the caller's expand/collapse, status-bar and
//! copy-path logic all depend on:
//!
//! - every JSON value is one `span.dObj`; property nodes add `dObjProp`,
//!   array elements (and the keyless root) add `arrElem`, the root adds
//!   `rootDObj`;
//! - non-empty composites carry `numChild<C>` plus an `expander`, an
//!   `ellipsis`, and a `blockInner` containing the children;
//! - the `collapsed` class marks nodes that start collapsed; the root never
//!   does;
//! - `line-number` attributes appear on value openers and on the closing
//!   token of non-empty composites, when numbering is enabled.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::{
    detect::strip_slashes,
    parser::parse,
    value::{escape_string, Value},
};

/// Flags controlling a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Collapse every non-root composite at first display.
    pub start_collapsed: bool,
    /// Assign line numbers and emit the gutter.
    pub show_line_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            start_collapsed: false,
            show_line_numbers: true,
        }
    }
}

/// The six displayable value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum NodeKind {
    String,
    Number,
    Bool,
    Null,
    Array,
    Object,
}

/// Per-kind display payload of a [`DisplayNode`].
///
/// Scalars carry everything serialization needs so that the pass never has
/// to consult the source [`Value`] again.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    /// A string scalar.
    String {
        /// JSON-escaped body, without surrounding quotes.
        escaped: String,
        /// Target URL when the raw value looks like a link. Crude heuristic
        /// (a literal `http` prefix); false positives are acceptable.
        link: Option<String>,
        /// Whether the string body itself parses as JSON, enabling the
        /// caller's "view nested" affordance.
        nested_json: bool,
    },
    /// A numeric scalar, displayed with host float formatting.
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// An array; elements live in `children`.
    Array,
    /// An object; properties live in `children`.
    Object,
}

/// One rendered unit, corresponding to exactly one JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    /// Display payload for this value.
    pub value: NodeValue,
    /// Property key, when this node is an object property. `None` means the
    /// node is an array element (or the root); `Some("")` is a legal key.
    pub key: Option<String>,
    /// Line number of this value's opening representation.
    pub line: Option<u32>,
    /// Line number of the closing token; non-empty composites only.
    pub close_line: Option<u32>,
    /// Number of children; 0 for scalars and empty composites.
    pub child_count: usize,
    /// Whether the node is initially collapsed.
    pub start_collapsed: bool,
    /// Child nodes, in document order.
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    /// The kind of value this node displays.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.value {
            NodeValue::String { .. } => NodeKind::String,
            NodeValue::Number(_) => NodeKind::Number,
            NodeValue::Boolean(_) => NodeKind::Bool,
            NodeValue::Null => NodeKind::Null,
            NodeValue::Array => NodeKind::Array,
            NodeValue::Object => NodeKind::Object,
        }
    }

    /// Returns `true` if this node is an object property.
    #[must_use]
    pub fn is_property(&self) -> bool {
        self.key.is_some()
    }
}

/// A fully built display tree, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTree {
    /// The root display node. Always rendered expanded.
    pub root: DisplayNode,
    /// JSONP wrapper name; adds opener/closer lines around the root.
    pub wrapper_function_name: Option<String>,
    /// Distinct non-zero child counts observed anywhere in the tree.
    pub child_counts: BTreeSet<usize>,
    /// Whether line numbers were assigned.
    pub numbered: bool,
    /// One past the last assigned line number; the JSONP closer's line.
    pub end_line: u32,
}

/// Serialized output handed back across the message channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// The full markup string.
    pub markup: String,
    /// Sorted distinct non-zero child counts, for count-keyed "N items"
    /// annotations instead of per-node labels.
    pub child_counts: Vec<usize>,
}

/// Per-pass state threaded through tree construction. Fresh on every call,
/// so concurrent renders share nothing.
struct RenderContext {
    next_line: u32,
    show_line_numbers: bool,
    start_collapsed: bool,
    child_counts: BTreeSet<usize>,
}

impl RenderContext {
    fn next_line_number(&mut self) -> Option<u32> {
        if self.show_line_numbers {
            let n = self.next_line;
            self.next_line += 1;
            Some(n)
        } else {
            None
        }
    }
}

/// Builds the display tree for `value`.
///
/// Line numbering is pre-order: a container's opening token is numbered,
/// then each child, then (for non-empty containers) the closing token. When
/// a wrapper name is present the opener takes line 1 and the root starts at
/// line 2.
#[must_use]
pub fn build_tree(
    value: &Value,
    wrapper_function_name: Option<&str>,
    options: &RenderOptions,
) -> RenderTree {
    let mut ctx = RenderContext {
        next_line: if wrapper_function_name.is_some() { 2 } else { 1 },
        show_line_numbers: options.show_line_numbers,
        start_collapsed: options.start_collapsed,
        child_counts: BTreeSet::new(),
    };
    let root = build_node(&mut ctx, value, None, true);
    RenderTree {
        root,
        wrapper_function_name: wrapper_function_name.map(str::to_string),
        child_counts: ctx.child_counts,
        numbered: options.show_line_numbers,
        end_line: ctx.next_line,
    }
}

fn build_node(
    ctx: &mut RenderContext,
    value: &Value,
    key: Option<&str>,
    is_root: bool,
) -> DisplayNode {
    let line = ctx.next_line_number();
    let (node_value, children, close_line) = match value {
        Value::Null => (NodeValue::Null, Vec::new(), None),
        Value::Boolean(b) => (NodeValue::Boolean(*b), Vec::new(), None),
        Value::Number(n) => (NodeValue::Number(*n), Vec::new(), None),
        Value::String(s) => (build_string(s), Vec::new(), None),
        Value::Array(arr) => {
            let children: Vec<DisplayNode> = arr
                .iter()
                .map(|element| build_node(ctx, element, None, false))
                .collect();
            let close_line = if children.is_empty() {
                None
            } else {
                ctx.next_line_number()
            };
            (NodeValue::Array, children, close_line)
        }
        Value::Object(map) => {
            let children: Vec<DisplayNode> = map
                .iter()
                .map(|(k, v)| build_node(ctx, v, Some(k), false))
                .collect();
            let close_line = if children.is_empty() {
                None
            } else {
                ctx.next_line_number()
            };
            (NodeValue::Object, children, close_line)
        }
    };
    let child_count = children.len();
    if child_count > 0 {
        ctx.child_counts.insert(child_count);
    }
    DisplayNode {
        value: node_value,
        key: key.map(str::to_string),
        line,
        close_line,
        child_count,
        start_collapsed: ctx.start_collapsed && !is_root && child_count > 0,
        children,
    }
}

fn build_string(s: &str) -> NodeValue {
    let escaped = escape_string(s);
    let link = s.starts_with("http").then(|| s.to_string());
    // A string that itself holds JSON gets a "view nested" marker. Parse
    // failures are swallowed; the string is simply not nested JSON.
    let nested_json = (s.starts_with('{') || s.starts_with('['))
        && parse(&strip_slashes(&escaped)).is_ok();
    NodeValue::String {
        escaped,
        link,
        nested_json,
    }
}

impl RenderTree {
    /// Serializes the tree to its markup string.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        let gutter_width = gutter_width_rem(self.end_line);
        if self.numbered {
            let _ = write!(
                out,
                r#"<div id="gutter" style="width: {gutter_width}"></div>"#
            );
            let _ = write!(
                out,
                r#"<div id="formattedJson" style="margin-left: {gutter_width}">"#
            );
        } else {
            out.push_str(r#"<div id="formattedJson">"#);
        }
        if let Some(name) = &self.wrapper_function_name {
            out.push_str(r#"<div id="jsonpOpener""#);
            if self.numbered {
                out.push_str(r#" line-number="1""#);
            }
            let _ = write!(out, ">{} ( </div>", escape_text(name));
        }
        serialize_node(&mut out, &self.root, true, false);
        if self.wrapper_function_name.is_some() {
            out.push_str(r#"<div id="jsonpCloser""#);
            if self.numbered {
                let _ = write!(out, r#" line-number="{}""#, self.end_line);
            }
            out.push_str(">)</div>");
        }
        out.push_str("</div>");
        out
    }

    /// The finished side table: sorted distinct child counts.
    #[must_use]
    pub fn child_counts_vec(&self) -> Vec<usize> {
        self.child_counts.iter().copied().collect()
    }
}

/// Builds the display tree and serializes it in one step.
#[must_use]
pub fn render(
    value: &Value,
    wrapper_function_name: Option<&str>,
    options: &RenderOptions,
) -> Rendered {
    let tree = build_tree(value, wrapper_function_name, options);
    Rendered {
        markup: tree.to_markup(),
        child_counts: tree.child_counts_vec(),
    }
}

fn serialize_node(out: &mut String, node: &DisplayNode, is_root: bool, trailing_comma: bool) {
    out.push_str("<span class=\"dObj");
    if node.is_property() {
        out.push_str(" dObjProp");
    } else {
        out.push_str(" arrElem");
    }
    if node.start_collapsed {
        out.push_str(" collapsed");
    }
    if node.child_count > 0 {
        let _ = write!(out, " numChild{}", node.child_count);
    }
    if is_root {
        out.push_str(" rootDObj");
    }
    out.push('"');
    if let Some(line) = node.line {
        let _ = write!(out, r#" line-number="{line}""#);
    }
    out.push('>');

    if node.child_count > 0 {
        out.push_str(r#"<span class="expander"></span>"#);
    }

    if let Some(key) = &node.key {
        let _ = write!(
            out,
            "\"<span class=\"key\">{}</span>\":&nbsp;",
            escape_text(&escape_string(key))
        );
    }

    match &node.value {
        NodeValue::String {
            escaped,
            link,
            nested_json,
        } => {
            out.push_str(r#"<span class="s">""#);
            match link {
                Some(url) => {
                    let _ = write!(
                        out,
                        r#"<span><a href="{}">{}</a></span>"#,
                        escape_attr(url),
                        escape_text(escaped)
                    );
                }
                None => {
                    let _ = write!(out, "<span>{}</span>", escape_text(escaped));
                }
            }
            out.push('"');
            if *nested_json {
                out.push_str(r#"<span class="nested"></span>"#);
            }
            out.push_str("</span>");
        }
        NodeValue::Number(n) => {
            let _ = write!(out, r#"<span class="n">{n}</span>"#);
        }
        NodeValue::Boolean(b) => {
            let _ = write!(out, r#"<span class="bl">{b}</span>"#);
        }
        NodeValue::Null => {
            out.push_str(r#"<span class="nl">null</span>"#);
        }
        NodeValue::Object => serialize_composite(out, node, '{', '}'),
        NodeValue::Array => serialize_composite(out, node, '[', ']'),
    }

    if trailing_comma {
        out.push(',');
    }
    out.push_str("</span>");
}

fn serialize_composite(out: &mut String, node: &DisplayNode, open: char, close: char) {
    let _ = write!(out, r#"<span class="b">{open}</span>"#);
    if node.child_count > 0 {
        out.push_str(r#"<span class="ellipsis"></span>"#);
        out.push_str(r#"<span class="blockInner">"#);
        let last = node.child_count - 1;
        for (i, child) in node.children.iter().enumerate() {
            serialize_node(out, child, false, i < last);
        }
        out.push_str("</span>");
    }
    out.push_str(r#"<span class="b lastB""#);
    if let Some(line) = node.close_line {
        let _ = write!(out, r#" line-number="{line}""#);
    }
    let _ = write!(out, ">{close}</span>");
}

/// Gutter width, half a rem per digit of the largest line number.
fn gutter_width_rem(end_line: u32) -> String {
    let digits = end_line.to_string().len();
    if digits % 2 == 0 {
        format!("{}rem", 1 + digits / 2)
    } else {
        format!("{}.5rem", 1 + digits / 2)
    }
}

/// Escapes text content for HTML.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes an HTML attribute value (double-quoted).
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
