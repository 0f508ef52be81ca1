use std::collections::BTreeMap;
use std::sync::LazyLock;

use am_core::{ContentType, DetectedContent, DetectionMethod, ParserConfig};
use regex::Regex;

use crate::image::image_token_spans;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

static MARKDOWN_MARKERS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"(?m)^#{1,6}\s+",
        r"\*\*.*?\*\*",
        r"\[.*?\]\(.*?\)",
        r"(?m)^-\s+",
        r"(?m)^[0-9]+\.\s+",
    ]
    .map(|pattern| Regex::new(pattern).expect("markdown marker pattern is valid"))
});

/// Classify raw input as markup, markdown or plain text.
///
/// Strategies, in order:
/// 1. Empty input is plain text with zero confidence
/// 2. Any angle-bracket tag selects markup
/// 3. Markdown markers (heading, bold, link, bullet, ordered item) select markdown
/// 4. Fallback to plain text
#[must_use]
pub fn detect_content_type(input: &str) -> DetectedContent {
    if input.trim().is_empty() {
        return DetectedContent {
            content_type: ContentType::PlainText,
            method: DetectionMethod::EmptyInput,
            confidence: 0.0,
        };
    }

    if TAG_RE.is_match(input) {
        return DetectedContent {
            content_type: ContentType::Markup,
            method: DetectionMethod::AngleBracketTags,
            confidence: 0.95,
        };
    }

    let markers = MARKDOWN_MARKERS
        .iter()
        .filter(|pattern| pattern.is_match(input))
        .count();
    if markers > 0 {
        let confidence = (0.6 + 0.1 * markers as f32).min(0.95);
        return DetectedContent {
            content_type: ContentType::Markdown,
            method: DetectionMethod::MarkdownMarkers,
            confidence,
        };
    }

    DetectedContent {
        content_type: ContentType::PlainText,
        method: DetectionMethod::Fallback,
        confidence: 0.5,
    }
}

/// Replace every `[key]` with its value. Image tokens are never rewritten,
/// even when a key matches their body.
#[must_use]
pub fn replace_placeholders(text: &str, placeholders: &BTreeMap<String, String>) -> String {
    if text.is_empty() || placeholders.is_empty() {
        return text.to_string();
    }

    let substitute = |segment: &str| {
        placeholders
            .iter()
            .fold(segment.to_string(), |current, (key, value)| {
                current.replace(&format!("[{key}]"), value)
            })
    };

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for (span, _) in image_token_spans(text, &ParserConfig::default()) {
        result.push_str(&substitute(&text[cursor..span.start]));
        result.push_str(&text[span.start..span.end]);
        cursor = span.end;
    }
    result.push_str(&substitute(&text[cursor..]));
    result
}

/// Replace all whitespace with U+00A0 so a label never wraps.
#[must_use]
pub fn to_non_breaking_spaces(text: &str) -> String {
    text.chars()
        .map(|character| {
            if character.is_whitespace() {
                '\u{a0}'
            } else {
                character
            }
        })
        .collect()
}
