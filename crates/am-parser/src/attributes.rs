use std::sync::LazyLock;

use am_core::AttributeMap;
use regex::Regex;

/// Straight and curly quote characters accepted around attribute values.
pub const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([A-Za-z0-9_]+)=(?:["'\x{201C}\x{201D}\x{2018}\x{2019}]([^"'\x{201C}\x{201D}\x{2018}\x{2019}]*)["'\x{201C}\x{201D}\x{2018}\x{2019}]|([^\s>]+))"#,
    )
    .expect("attribute pattern is valid")
});

/// Parse `key=value` pairs out of the text between a tag name and its `>`.
///
/// Values may be unquoted or wrapped in any mix of straight and curly quotes.
/// A key repeated later in the fragment overwrites the earlier value.
#[must_use]
pub fn parse_attributes(fragment: &str) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    if fragment.is_empty() {
        return attributes;
    }

    for captures in ATTRIBUTE_RE.captures_iter(fragment) {
        let Some(key) = captures.get(1) else {
            continue;
        };
        let raw = captures
            .get(2)
            .map(|quoted| quoted.as_str())
            .filter(|quoted| !quoted.is_empty())
            .or_else(|| captures.get(3).map(|unquoted| unquoted.as_str()))
            .unwrap_or_default();

        let value = strip_quotes(raw).replace("\\\"", "\"").replace("\\'", "'");
        attributes.insert(key.as_str().to_string(), value);
    }

    attributes
}

/// Strip surrounding quote characters of any supported kind, then whitespace.
#[must_use]
pub fn clean_quoted_value(value: &str) -> String {
    strip_quotes(value).trim().to_string()
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|ch| QUOTE_CHARS.contains(&ch))
}

/// Horizontal alignment attribute, quote-cleaned.
#[must_use]
pub fn halign(attributes: &AttributeMap) -> Option<String> {
    cleaned(attributes, "halign")
}

#[must_use]
pub fn valign(attributes: &AttributeMap) -> Option<String> {
    cleaned(attributes, "valign")
}

#[must_use]
pub fn color(attributes: &AttributeMap) -> Option<String> {
    cleaned(attributes, "color")
}

/// Link target; an empty `href` counts as missing.
#[must_use]
pub fn href(attributes: &AttributeMap) -> Option<String> {
    cleaned(attributes, "href")
}

fn cleaned(attributes: &AttributeMap, name: &str) -> Option<String> {
    attributes
        .get(name)
        .map(|value| clean_quoted_value(value))
        .filter(|value| !value.is_empty())
}
