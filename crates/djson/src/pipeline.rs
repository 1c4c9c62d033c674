//! The detect-then-render pipeline behind the message channel.
//!
//! The UI side sends raw page text and receives a sequence of tagged
//! [`Response`] messages back: either a single `NotJson`, or `Formatting`
//! (show a spinner, the render may be expensive) followed by `Formatted`
//! with the markup and metadata. Each call is synchronous and owns all of
//! its state; nothing is shared between calls.

use crate::{
    detect::{detect, NotJson},
    render::{render, RenderOptions},
};

/// Caller preferences for one formatting request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    /// Collapse every non-root composite at first display.
    pub start_collapsed: bool,
    /// Force collapsing when the raw text is longer than this many bytes.
    /// Size is a caller-side proxy for "too big to expand eagerly".
    pub start_collapsed_if_big_above: Option<usize>,
    /// Assign line numbers and emit the gutter.
    pub show_line_numbers: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            start_collapsed: false,
            start_collapsed_if_big_above: None,
            show_line_numbers: true,
        }
    }
}

/// A message posted back to the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Response {
    /// The text is not JSON or JSONP; reveal the original page untouched.
    NotJson {
        /// Machine-readable rejection reason.
        reason: String,
    },
    /// Detection succeeded; formatting is underway.
    Formatting,
    /// The finished render.
    Formatted {
        /// Markup implementing the structural contract of [`crate::render`].
        markup: String,
        /// The exact source text that parsed, for raw re-inspection.
        valid_source_text: String,
        /// Distinct non-zero child counts, for count-keyed annotations.
        child_counts: Vec<usize>,
    },
}

/// Runs the pipeline on `text`, posting each [`Response`] to `send`.
///
/// Emits `NotJson` once on failure, or `Formatting` followed by `Formatted`
/// on success.
pub fn handle_text(text: &str, options: &FormatOptions, mut send: impl FnMut(Response)) {
    match detect(text) {
        Err(reason) => send(Response::NotJson {
            reason: reason.to_string(),
        }),
        Ok(payload) => {
            send(Response::Formatting);
            let rendered = render(
                &payload.value,
                payload.wrapper_function_name.as_deref(),
                &render_options(text, options),
            );
            send(Response::Formatted {
                markup: rendered.markup,
                valid_source_text: payload.valid_source_text,
                child_counts: rendered.child_counts,
            });
        }
    }
}

/// Classifies `text` and renders it, returning the final outcome directly.
///
/// Convenience wrapper over [`handle_text`] for callers that do not need
/// the intermediate `Formatting` notification.
///
/// # Errors
///
/// Returns the [`NotJson`] reason when `text` is neither JSON nor JSONP.
pub fn format_text(text: &str, options: &FormatOptions) -> Result<Response, NotJson> {
    let payload = detect(text)?;
    let rendered = render(
        &payload.value,
        payload.wrapper_function_name.as_deref(),
        &render_options(text, options),
    );
    Ok(Response::Formatted {
        markup: rendered.markup,
        valid_source_text: payload.valid_source_text,
        child_counts: rendered.child_counts,
    })
}

fn render_options(text: &str, options: &FormatOptions) -> RenderOptions {
    let force_collapse = options
        .start_collapsed_if_big_above
        .is_some_and(|limit| text.len() > limit);
    RenderOptions {
        start_collapsed: options.start_collapsed || force_collapse,
        show_line_numbers: options.show_line_numbers,
    }
}

#[cfg(test)]
mod tests {
    use super::{handle_text, FormatOptions, Response};

    fn collect(text: &str, options: &FormatOptions) -> Vec<Response> {
        let mut responses = Vec::new();
        handle_text(text, options, |r| responses.push(r));
        responses
    }

    #[test]
    fn success_emits_formatting_then_formatted() {
        let responses = collect(r#"{"a":1}"#, &FormatOptions::default());
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0], Response::Formatting);
        let Response::Formatted {
            valid_source_text,
            child_counts,
            ..
        } = &responses[1]
        else {
            panic!("expected Formatted")
        };
        assert_eq!(valid_source_text, r#"{"a":1}"#);
        assert_eq!(child_counts, &vec![1]);
    }

    #[test]
    fn failure_emits_not_json_only() {
        let responses = collect("plain text", &FormatOptions::default());
        assert_eq!(
            responses,
            vec![Response::NotJson {
                reason: "no opening parenthesis".into()
            }]
        );
    }

    #[test]
    fn size_threshold_forces_collapse() {
        let text = r#"{"a":[1,2,3]}"#;
        let options = FormatOptions {
            start_collapsed_if_big_above: Some(4),
            ..FormatOptions::default()
        };
        let responses = collect(text, &options);
        let Response::Formatted { markup, .. } = &responses[1] else {
            panic!("expected Formatted")
        };
        assert!(markup.contains("collapsed"));

        let relaxed = FormatOptions::default();
        let responses = collect(text, &relaxed);
        let Response::Formatted { markup, .. } = &responses[1] else {
            panic!("expected Formatted")
        };
        assert!(!markup.contains("collapsed"));
    }
}
