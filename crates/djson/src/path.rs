//! Paths into a JSON document.
//!
//! The rendered markup tags every node as either a property or an array
//! element, so the caller can reconstruct a `$`-prefixed path (`$.users[0]
//! .name`) for any hovered node by walking up the tree. This module is the
//! other half of that contract: formatting such paths, parsing them back,
//! and resolving them against a [`Value`] for copy-value and view-nested
//! actions.

use std::fmt;

use crate::value::Value;

/// A component in the path to a JSON value: an object key or array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    /// An object property key.
    Key(String),
    /// An array element index.
    Index(usize),
}

impl From<&str> for PathComponent {
    fn from(s: &str) -> Self {
        Self::Key(s.into())
    }
}

impl From<usize> for PathComponent {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, ".{k}"),
            Self::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Formats a path as a `$`-prefixed JSON-path-like string.
///
/// ```
/// use djson::{format_path, PathComponent};
///
/// let path = [PathComponent::from("users"), PathComponent::from(0)];
/// assert_eq!(format_path(&path), "$.users[0]");
/// ```
#[must_use]
pub fn format_path(path: &[PathComponent]) -> String {
    use fmt::Write;

    let mut out = String::from("$");
    for component in path {
        let _ = write!(out, "{component}");
    }
    out
}

/// Parses a `$`-prefixed dot/bracket path string back into components.
///
/// Returns `None` for malformed paths. Keys containing `.`, `[`, or `]` are
/// not representable in this notation; such paths do not round-trip, the
/// same limitation the dot/bracket convention has always had.
#[must_use]
pub fn parse_path(path: &str) -> Option<Vec<PathComponent>> {
    let rest = path.strip_prefix('$')?;
    let mut components = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                let mut key = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    key.push(next);
                    chars.next();
                }
                components.push(PathComponent::Key(key));
            }
            '[' => {
                let mut digits = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(d) if d.is_ascii_digit() => digits.push(d),
                        _ => return None,
                    }
                }
                components.push(PathComponent::Index(digits.parse().ok()?));
            }
            _ => return None,
        }
    }
    Some(components)
}

/// Resolves a path against a value, returning the addressed sub-value.
///
/// Keys only address objects and indices only address arrays; anything else
/// is `None`.
#[must_use]
pub fn resolve_path<'a>(value: &'a Value, path: &[PathComponent]) -> Option<&'a Value> {
    let mut current = value;
    for component in path {
        current = match (component, current) {
            (PathComponent::Key(k), Value::Object(map)) => map.get(k)?,
            (PathComponent::Index(i), Value::Array(arr)) => arr.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}
