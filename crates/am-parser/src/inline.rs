//! Inline content: `**bold**` spans, `<a>`/`<b>`/`<font>` tags, image tokens
//! and line breaks inside a text run.

use std::sync::LazyLock;

use am_core::{
    Diagnostic, DiagnosticCategory, InlineLink, InlineNode, InlineSpan, InlineSpanKind, Metadata,
    MetadataOccurrence, ParserConfig, Span,
};
use regex::{Captures, Regex};
use tracing::debug;

use crate::attributes::{href, parse_attributes};
use crate::image::image_token_spans;
use crate::metadata::metadata_for;
use crate::tags::{StrippedText, find_metadata_tags, strip_metadata_tags};

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

static INLINE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:a|b|font)(?:\s[^>]*)?>").expect("inline open pattern is valid")
});

static INLINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("inline break pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineTag {
    Anchor,
    Bold,
    Font,
}

static INLINE_TAG_PATTERNS: LazyLock<[(InlineTag, Regex); 3]> = LazyLock::new(|| {
    let pattern = |name: &str| {
        Regex::new(&format!(r"(?i)<{name}(\s[^>]*)?>(.*?)</{name}\s*>"))
            .expect("inline tag pattern is valid")
    };
    [
        (InlineTag::Anchor, pattern("a")),
        (InlineTag::Bold, pattern("b")),
        (InlineTag::Font, pattern("font")),
    ]
});

/// Split `text` into plain and bold spans on non-greedy `**...**` pairs.
///
/// Never empty: text without markers yields one plain span holding all of it.
#[must_use]
pub fn parse_bold_spans(text: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for captures in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            spans.push(InlineSpan::plain(&text[cursor..whole.start()]));
        }
        spans.push(InlineSpan::bold(inner.as_str()));
        cursor = whole.end();
    }

    if cursor < text.len() {
        spans.push(InlineSpan::plain(&text[cursor..]));
    }
    if spans.is_empty() {
        spans.push(InlineSpan::plain(text));
    }
    spans
}

/// Where an inline fragment sits, for pairing links with metadata tags.
#[derive(Debug, Clone, Copy)]
pub struct InlineScope<'a> {
    metadata: &'a [MetadataOccurrence],
    stripped: Option<&'a StrippedText>,
    base_offset: usize,
    max_depth: usize,
}

impl Default for InlineScope<'_> {
    fn default() -> Self {
        Self::detached(ParserConfig::default().max_inline_depth)
    }
}

impl<'a> InlineScope<'a> {
    /// A scope with no metadata to attach.
    #[must_use]
    pub const fn detached(max_depth: usize) -> Self {
        Self {
            metadata: &[],
            stripped: None,
            base_offset: 0,
            max_depth,
        }
    }

    /// Fragments are slices of `stripped.text`; `metadata` holds the tags
    /// found in the source before stripping.
    #[must_use]
    pub const fn new(
        metadata: &'a [MetadataOccurrence],
        stripped: &'a StrippedText,
        max_depth: usize,
    ) -> Self {
        Self {
            metadata,
            stripped: Some(stripped),
            base_offset: 0,
            max_depth,
        }
    }

    /// The same scope for a fragment starting `offset` bytes further in.
    #[must_use]
    pub const fn at(self, offset: usize) -> Self {
        Self {
            base_offset: self.base_offset + offset,
            ..self
        }
    }

    /// Position of a fragment-local offset in the source text.
    #[must_use]
    pub fn source_offset(&self, local: usize) -> usize {
        let position = self.base_offset + local;
        self.stripped
            .map_or(position, |stripped| stripped.original_offset(position))
    }

    pub(crate) fn metadata_at(&self, local: usize) -> Metadata {
        if self.metadata.is_empty() {
            return Metadata::Absent;
        }
        metadata_for(self.metadata, self.source_offset(local))
    }
}

/// Parse `<a>`, `<b>` and `<font>` tags into nodes; text outside them is
/// split into bold spans.
///
/// Nesting deeper than the scope's depth limit is kept as literal text. The
/// tag patterns close at the first matching end tag, so same-name nesting
/// never goes deeper than one level and the limit only bites when it is set
/// very low.
#[must_use]
pub fn parse_inline_tags(text: &str, scope: &InlineScope<'_>, depth: usize) -> Vec<InlineNode> {
    let mut diagnostics = Vec::new();
    inline_tags(text, scope, depth, &mut diagnostics)
}

pub(crate) fn inline_tags(
    text: &str,
    scope: &InlineScope<'_>,
    depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<InlineNode> {
    if text.is_empty() {
        return Vec::new();
    }
    if depth > scope.max_depth {
        debug!(depth, "inline nesting limit reached; keeping literal text");
        diagnostics.push(
            Diagnostic::warning(format!(
                "inline tags nested deeper than {} levels were kept as text",
                scope.max_depth
            ))
            .with_category(DiagnosticCategory::Recovery)
            .with_span(Span::new(scope.source_offset(0), scope.source_offset(text.len()))),
        );
        return vec![InlineNode::text(text)];
    }
    if !INLINE_OPEN_RE.is_match(text) {
        return bold_nodes(text);
    }

    let mut nodes = Vec::new();
    let mut cursor = 0;
    let mut matched = 0_usize;

    while let Some((tag, captures)) = next_inline_tag(text, cursor) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(2)) else {
            break;
        };
        matched += 1;

        if whole.start() > cursor {
            nodes.extend(inline_tags(
                &text[cursor..whole.start()],
                &scope.at(cursor),
                depth + 1,
                diagnostics,
            ));
        }

        let attributes = captures
            .get(1)
            .map(|fragment| parse_attributes(fragment.as_str()))
            .unwrap_or_default();
        let children = inline_tags(
            inner.as_str(),
            &scope.at(inner.start()),
            depth + 1,
            diagnostics,
        );

        nodes.push(match tag {
            InlineTag::Anchor => {
                let href = href(&attributes).unwrap_or_default();
                let metadata = if href.is_empty() {
                    Metadata::Absent
                } else {
                    scope.metadata_at(whole.start())
                };
                InlineNode::Link(InlineLink {
                    href,
                    metadata,
                    children,
                })
            }
            InlineTag::Bold => InlineNode::Bold { children },
            InlineTag::Font => InlineNode::Font {
                attributes,
                children,
            },
        });
        cursor = whole.end();
    }

    if cursor < text.len() {
        if matched == 0 {
            nodes.extend(bold_nodes(text));
        } else {
            nodes.extend(inline_tags(
                &text[cursor..],
                &scope.at(cursor),
                depth + 1,
                diagnostics,
            ));
        }
    } else if nodes.is_empty() {
        nodes.extend(bold_nodes(text));
    }
    nodes
}

/// Earliest inline tag match at or after `from`.
fn next_inline_tag(text: &str, from: usize) -> Option<(InlineTag, Captures<'_>)> {
    INLINE_TAG_PATTERNS
        .iter()
        .filter_map(|(tag, regex)| regex.captures_at(text, from).map(|captures| (*tag, captures)))
        .min_by_key(|(_, captures)| captures.get(0).map_or(usize::MAX, |whole| whole.start()))
}

fn bold_nodes(text: &str) -> Vec<InlineNode> {
    parse_bold_spans(text)
        .into_iter()
        .filter(|span| !span.content.is_empty())
        .map(|span| match span.kind {
            InlineSpanKind::Plain => InlineNode::text(span.content),
            InlineSpanKind::Bold => InlineNode::Bold {
                children: vec![InlineNode::text(span.content)],
            },
        })
        .collect()
}

/// Parse a standalone text run: metadata tags are stripped and paired with
/// the links they precede, image tokens and `<br>` become their own nodes.
#[must_use]
pub fn parse_inline_content(text: &str) -> Vec<InlineNode> {
    parse_inline_content_with(text, &ParserConfig::default())
}

#[must_use]
pub fn parse_inline_content_with(text: &str, config: &ParserConfig) -> Vec<InlineNode> {
    let metadata = find_metadata_tags(text);
    let stripped = strip_metadata_tags(text);
    let scope = InlineScope::new(&metadata, &stripped, config.max_inline_depth);
    let mut diagnostics = Vec::new();
    inline_run(&stripped.text, &scope, config, &mut diagnostics)
}

enum RunMarker {
    Break,
    Image(am_core::ImageToken),
}

/// Parse a text run: inline tags first, then `<br>` and image tokens split
/// the leaf text, so a tag spanning a break stays one node.
pub(crate) fn inline_run(
    text: &str,
    scope: &InlineScope<'_>,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<InlineNode> {
    split_leaves(inline_tags(text, scope, 0, diagnostics), config)
}

fn split_leaves(nodes: Vec<InlineNode>, config: &ParserConfig) -> Vec<InlineNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            InlineNode::Text { text } => out.extend(split_text(&text, config)),
            InlineNode::Bold { children } => out.push(InlineNode::Bold {
                children: split_leaves(children, config),
            }),
            InlineNode::Font {
                attributes,
                children,
            } => out.push(InlineNode::Font {
                attributes,
                children: split_leaves(children, config),
            }),
            InlineNode::Link(mut link) => {
                link.children = split_leaves(std::mem::take(&mut link.children), config);
                out.push(InlineNode::Link(link));
            }
            other => out.push(other),
        }
    }
    out
}

fn split_text(text: &str, config: &ParserConfig) -> Vec<InlineNode> {
    let mut markers: Vec<(Span, RunMarker)> = image_token_spans(text, config)
        .into_iter()
        .map(|(span, token)| (span, RunMarker::Image(token)))
        .chain(
            INLINE_BREAK_RE
                .find_iter(text)
                .map(|found| (Span::new(found.start(), found.end()), RunMarker::Break)),
        )
        .collect();
    if markers.is_empty() {
        return vec![InlineNode::text(text)];
    }
    markers.sort_by_key(|(span, _)| span.start);

    let mut nodes = Vec::new();
    let mut cursor = 0;
    for (span, marker) in markers {
        if span.start < cursor {
            continue;
        }
        if span.start > cursor {
            nodes.push(InlineNode::text(&text[cursor..span.start]));
        }
        nodes.push(match marker {
            RunMarker::Break => InlineNode::LineBreak,
            RunMarker::Image(token) => InlineNode::Image(token),
        });
        cursor = span.end;
    }
    if cursor < text.len() {
        nodes.push(InlineNode::text(&text[cursor..]));
    }
    nodes
}
