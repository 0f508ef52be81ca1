//! Separator, block and metadata tag discovery.
//!
//! Block tags are found in two phases: every catalog tag contributes
//! candidates from a well-formed and a tolerant pattern, then
//! [`resolve_overlaps`] reduces the candidates to a non-overlapping set.

use std::sync::LazyLock;

use am_core::{BLOCK_TAGS, MetadataOccurrence, SeparatorOccurrence, Span, TagOccurrence, TagPosition};
use regex::Regex;
use tracing::trace;

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<hr\s*/?>").expect("separator pattern is valid"));

static METADATA_SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<CDATA\s+([^>]*?)/>").expect("self-closing metadata pattern is valid")
});

static METADATA_PAIRED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<CDATA>(.*?)</CDATA>").expect("paired metadata pattern is valid")
});

struct BlockPattern {
    well_formed: Regex,
    /// Closed by a second opening tag instead of a closing one.
    tolerant: Regex,
}

/// One pattern pair per catalog tag, longest names first. Ties keep catalog order.
static BLOCK_PATTERNS: LazyLock<Vec<BlockPattern>> = LazyLock::new(|| {
    let mut tags = BLOCK_TAGS.to_vec();
    tags.sort_by(|left, right| right.len().cmp(&left.len()));
    tags.into_iter()
        .map(|tag| {
            let name = regex::escape(tag);
            BlockPattern {
                well_formed: Regex::new(&format!(
                    r"(?is)<({name})((?:\s[^>]*)?)>(.*?)</{name}\s*>"
                ))
                .expect("block tag pattern is valid"),
                tolerant: Regex::new(&format!(r"(?is)<({name})((?:\s[^>]*)?)>(.*?)<{name}\s*>"))
                    .expect("tolerant block tag pattern is valid"),
            }
        })
        .collect()
});

#[must_use]
pub fn find_separators(text: &str) -> Vec<SeparatorOccurrence> {
    SEPARATOR_RE
        .find_iter(text)
        .map(|found| SeparatorOccurrence {
            start: found.start(),
            len: found.len(),
        })
        .collect()
}

/// Every block tag match in discovery order: tag order, then pattern order,
/// then position. Candidates may overlap.
#[must_use]
pub fn find_block_candidates(text: &str) -> Vec<TagOccurrence> {
    let mut candidates = Vec::new();
    for pattern in BLOCK_PATTERNS.iter() {
        for regex in [&pattern.well_formed, &pattern.tolerant] {
            for captures in regex.captures_iter(text) {
                let (Some(whole), Some(name), Some(inner)) =
                    (captures.get(0), captures.get(1), captures.get(3))
                else {
                    continue;
                };
                candidates.push(TagOccurrence {
                    start: whole.start(),
                    tag_name: name.as_str().to_ascii_lowercase(),
                    raw_attributes: captures
                        .get(2)
                        .map(|attributes| attributes.as_str().to_string())
                        .unwrap_or_default(),
                    inner_content: inner.as_str().to_string(),
                    inner_offset: inner.start() - whole.start(),
                    len: whole.len(),
                });
            }
        }
    }
    candidates
}

/// Reduce candidates to a non-overlapping set sorted by start.
///
/// A candidate inside an accepted one (equal spans included) is dropped, as is
/// one that partially overlaps an accepted one. A candidate that contains
/// accepted ones replaces them.
#[must_use]
pub fn resolve_overlaps(candidates: Vec<TagOccurrence>) -> Vec<TagOccurrence> {
    let mut accepted: Vec<TagOccurrence> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let span = candidate.span();
        let rejected = accepted.iter().any(|existing| {
            let existing_span = existing.span();
            existing_span.contains(span) || existing_span.overlaps_partially(span)
        });
        if rejected {
            trace!(tag = %candidate.tag_name, start = span.start, "dropping overlapped block tag");
            continue;
        }

        accepted.retain(|existing| !span.contains(existing.span()));
        accepted.push(candidate);
    }

    accepted.sort_by_key(|occurrence| occurrence.start);
    accepted
}

#[must_use]
pub fn find_block_tags(text: &str) -> Vec<TagOccurrence> {
    resolve_overlaps(find_block_candidates(text))
}

/// Self-closing and paired metadata tags, sorted by start, one per start offset.
#[must_use]
pub fn find_metadata_tags(text: &str) -> Vec<MetadataOccurrence> {
    let mut occurrences: Vec<MetadataOccurrence> = Vec::new();

    for regex in [&*METADATA_SELF_CLOSING_RE, &*METADATA_PAIRED_RE] {
        for captures in regex.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if occurrences
                .iter()
                .any(|existing| existing.start == whole.start())
            {
                continue;
            }
            occurrences.push(MetadataOccurrence {
                start: whole.start(),
                end: whole.end(),
                payload: captures
                    .get(1)
                    .map(|payload| payload.as_str().to_string())
                    .unwrap_or_default(),
            });
        }
    }

    occurrences.sort_by_key(|occurrence| occurrence.start);
    occurrences
}

/// Separators and blocks as one stream ordered by start.
#[must_use]
pub fn merge_positions(
    separators: Vec<SeparatorOccurrence>,
    blocks: Vec<TagOccurrence>,
) -> Vec<TagPosition> {
    let mut positions: Vec<TagPosition> = separators
        .into_iter()
        .map(TagPosition::Separator)
        .chain(blocks.into_iter().map(TagPosition::Block))
        .collect();
    positions.sort_by_key(TagPosition::start);
    positions
}

/// Text with metadata tags cut out, able to map positions back to the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrippedText {
    pub text: String,
    /// `(position in stripped text, removed byte count)`, ascending.
    removals: Vec<(usize, usize)>,
}

impl StrippedText {
    /// Wrap text that has nothing to strip.
    #[must_use]
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            removals: Vec::new(),
        }
    }

    /// Map a position in the stripped text to the source text.
    ///
    /// A position sitting where a tag was removed maps past that tag.
    #[must_use]
    pub fn original_offset(&self, position: usize) -> usize {
        position
            + self
                .removals
                .iter()
                .take_while(|(at, _)| *at <= position)
                .map(|(_, len)| len)
                .sum::<usize>()
    }

    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removals.len()
    }
}

/// Remove every metadata tag from `text`.
#[must_use]
pub fn strip_metadata_tags(text: &str) -> StrippedText {
    let mut spans: Vec<Span> = METADATA_SELF_CLOSING_RE
        .find_iter(text)
        .chain(METADATA_PAIRED_RE.find_iter(text))
        .map(|found| Span::new(found.start(), found.end()))
        .collect();
    if spans.is_empty() {
        return StrippedText::unchanged(text);
    }
    spans.sort_by_key(|span| span.start);

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }

    let mut stripped = StrippedText::default();
    let mut cursor = 0;
    for span in merged {
        stripped.text.push_str(&text[cursor..span.start]);
        stripped.removals.push((stripped.text.len(), span.len()));
        cursor = span.end;
    }
    stripped.text.push_str(&text[cursor..]);
    stripped
}
