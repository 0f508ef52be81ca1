use std::sync::LazyLock;

use am_core::{BoundedCache, MarkdownLine, MarkdownLineKind, MarkdownSection, ParserConfig};
use regex::{Captures, Regex};
use tracing::trace;

use crate::inline::parse_bold_spans;

static BULLET_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\s])[^\S\n]*(-)[^\S\n]").expect("bullet break pattern is valid")
});

static ORDERED_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^\s0-9])[^\S\n]*([0-9]+\.)[^\S\n]").expect("ordered break pattern is valid")
});

static ORDERED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\. ").expect("ordered item pattern is valid"));

/// Unify line endings, expand literal `\n` escapes and move list markers that
/// follow other text on the same line onto their own line.
///
/// Markers inside `[...]` are left alone.
#[must_use]
pub fn normalize_markdown(markdown: &str) -> String {
    let unified = markdown
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("\\n", "\n");
    let bullets = break_before_marker(&unified, &BULLET_BREAK_RE);
    break_before_marker(&bullets, &ORDERED_BREAK_RE)
}

fn break_before_marker(text: &str, pattern: &Regex) -> String {
    let depths = bracket_depths(text);
    pattern
        .replace_all(text, |captures: &Captures<'_>| {
            let (Some(whole), Some(previous), Some(marker)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                return String::new();
            };
            if depths.get(marker.start()).copied().unwrap_or(0) > 0 {
                return whole.as_str().to_string();
            }
            format!("{}\n{} ", previous.as_str(), marker.as_str())
        })
        .into_owned()
}

/// Open `[` count before each byte offset.
fn bracket_depths(text: &str) -> Vec<usize> {
    let mut depths = Vec::with_capacity(text.len() + 1);
    let mut depth = 0_usize;
    for byte in text.bytes() {
        depths.push(depth);
        match byte {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depths.push(depth);
    depths
}

/// Classify a line by its trimmed prefix.
#[must_use]
pub fn classify_line(line: &str) -> MarkdownLineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        MarkdownLineKind::Blank
    } else if trimmed.starts_with("#### ") {
        MarkdownLineKind::Heading4
    } else if trimmed.starts_with("### ") {
        MarkdownLineKind::Heading3
    } else if trimmed.starts_with("## ") {
        MarkdownLineKind::Heading2
    } else if trimmed.starts_with("# ") {
        MarkdownLineKind::Heading1
    } else if trimmed.starts_with("- ") {
        MarkdownLineKind::BulletItem
    } else if ORDERED_ITEM_RE.is_match(trimmed) {
        MarkdownLineKind::OrderedItem
    } else {
        MarkdownLineKind::PlainText
    }
}

#[must_use]
pub fn parse_markdown_line(line: &str) -> MarkdownLine {
    let trimmed = line.trim();
    let kind = classify_line(trimmed);
    let mut ordered_index = None;

    let content = match kind {
        MarkdownLineKind::Heading1 => &trimmed[2..],
        MarkdownLineKind::Heading2 => &trimmed[3..],
        MarkdownLineKind::Heading3 => &trimmed[4..],
        MarkdownLineKind::Heading4 => &trimmed[5..],
        MarkdownLineKind::BulletItem => &trimmed[2..],
        MarkdownLineKind::OrderedItem => match ORDERED_ITEM_RE.captures(trimmed) {
            Some(captures) => {
                ordered_index = captures.get(1).map(|digits| digits.as_str().to_string());
                captures
                    .get(0)
                    .map_or(trimmed, |marker| &trimmed[marker.end()..])
            }
            None => trimmed,
        },
        MarkdownLineKind::PlainText | MarkdownLineKind::Blank => trimmed,
    };

    MarkdownLine {
        kind,
        content: content.to_string(),
        ordered_index,
        raw_line: line.to_string(),
        spans: if kind == MarkdownLineKind::Blank {
            Vec::new()
        } else {
            parse_bold_spans(content)
        },
    }
}

/// Normalize and group markdown into sections with the default gap.
#[must_use]
pub fn parse_markdown_sections(markdown: &str) -> Vec<MarkdownSection> {
    let gap = ParserConfig::default().markdown_section_gap;
    segment(markdown, gap, parse_markdown_line)
}

/// Like [`parse_markdown_sections`], memoizing line parses by trimmed text.
pub fn parse_markdown_sections_cached(
    markdown: &str,
    line_cache: &mut BoundedCache<String, MarkdownLine>,
    section_gap: f32,
) -> Vec<MarkdownSection> {
    segment(markdown, section_gap, |line| {
        let key = line.trim().to_string();
        if let Some(cached) = line_cache.get(&key) {
            trace!(line = %key, "markdown line cache hit");
            let mut hit = cached.clone();
            hit.raw_line = line.to_string();
            return hit;
        }
        let parsed = parse_markdown_line(line);
        line_cache.set(key, parsed.clone());
        parsed
    })
}

fn segment(
    markdown: &str,
    section_gap: f32,
    mut parse_line: impl FnMut(&str) -> MarkdownLine,
) -> Vec<MarkdownSection> {
    let normalized = normalize_markdown(markdown);
    let mut sections = Vec::new();
    let mut current: Vec<MarkdownLine> = Vec::new();
    let mut in_list = false;

    let mut close = |current: &mut Vec<MarkdownLine>| {
        if !current.is_empty() {
            sections.push(MarkdownSection {
                lines: std::mem::take(current),
                trailing_gap: section_gap,
            });
        }
    };

    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            close(&mut current);
            in_list = false;
            continue;
        }

        let parsed = parse_line(line);
        let is_list_item = parsed.kind.is_list_item();

        if parsed.kind.is_heading() {
            close(&mut current);
        }
        if is_list_item && !in_list {
            close(&mut current);
        }
        if !is_list_item && in_list {
            close(&mut current);
        }
        in_list = is_list_item;

        current.push(parsed);
    }
    close(&mut current);

    sections
}
