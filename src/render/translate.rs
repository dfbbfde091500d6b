//! Inline translation post-processing.
//!
//! Translated strings may carry inline markers of the form
//! `{{{shown}}{{original}}{{scope}}}` so an editor can locate and retranslate
//! them in the rendered page. Before the page leaves the renderer the markers
//! are either stripped down to the shown text or turned into annotated spans.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::ops::Range;
use tera::escape_html;

// Shown text may span lines.
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{\{\{(.*?)\}\}\{\{(.*?)\}\}\{\{(.*?)\}\}\}").expect("marker pattern is valid")
});

/// Opening tags of elements whose content is raw text, not markup.
static RAW_TEXT_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(title|script|style|textarea)\b[^>]*>").expect("raw text pattern is valid")
});

/// Post-processes a rendered response body in place.
pub trait TranslationInliner: Send + Sync {
    fn process_response_body(&self, body: &mut String);
}

#[derive(Debug, Serialize)]
struct MarkerPayload<'a> {
    shown: &'a str,
    original: &'a str,
    scope: &'a str,
}

/// Marker-based inline translator.
///
/// When disabled, markers are replaced by their shown text. When enabled,
/// markers in text content become `<span data-translate="...">` elements;
/// markers inside a tag (attribute values) or inside the content of a raw
/// text element (`title`, `script`, `style`, `textarea`) are reduced to
/// their shown text since a span cannot be placed there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineTranslator {
    enabled: bool,
}

impl InlineTranslator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

fn inside_tag(body: &str, offset: usize) -> bool {
    let before = &body[..offset];
    match (before.rfind('<'), before.rfind('>')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Byte ranges of raw text element content, up to the matching close tag
/// (or the end of the body when it is never closed).
fn raw_text_ranges(body: &str) -> Vec<Range<usize>> {
    let lowercase = body.to_ascii_lowercase();
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for caps in RAW_TEXT_OPEN.captures_iter(body) {
        let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if ranges.last().is_some_and(|range| range.contains(&open.start())) {
            continue;
        }
        let close_tag = format!("</{}", name.as_str().to_ascii_lowercase());
        let end = lowercase[open.end()..]
            .find(&close_tag)
            .map_or(body.len(), |at| open.end() + at);
        ranges.push(open.end()..end);
    }
    ranges
}

fn annotate(caps: &Captures<'_>) -> String {
    let shown = &caps[1];
    let payload = MarkerPayload {
        shown,
        original: &caps[2],
        scope: &caps[3],
    };
    match serde_json::to_string(&[payload]) {
        Ok(json) => format!(
            "<span data-translate=\"{}\">{}</span>",
            escape_html(&json),
            shown
        ),
        Err(error) => {
            tracing::warn!(%error, "failed to encode translation marker");
            shown.to_string()
        }
    }
}

impl TranslationInliner for InlineTranslator {
    fn process_response_body(&self, body: &mut String) {
        if !MARKER.is_match(body) {
            return;
        }

        let raw_text = if self.enabled {
            raw_text_ranges(body)
        } else {
            Vec::new()
        };
        let mut processed = String::with_capacity(body.len());
        let mut last = 0;
        let mut markers = 0usize;
        for caps in MARKER.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            processed.push_str(&body[last..whole.start()]);
            let in_raw_text = raw_text.iter().any(|range| range.contains(&whole.start()));
            if self.enabled && !in_raw_text && !inside_tag(body, whole.start()) {
                processed.push_str(&annotate(&caps));
            } else {
                processed.push_str(&caps[1]);
            }
            last = whole.end();
            markers += 1;
        }
        processed.push_str(&body[last..]);

        tracing::debug!(markers, enabled = self.enabled, "processed translation markers");
        *body = processed;
    }
}
