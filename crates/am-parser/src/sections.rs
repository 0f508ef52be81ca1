//! Markup assembly: `<br>` splitting, block bodies and the section loop.

use std::sync::LazyLock;

use am_core::{
    BlockBody, BlockElement, BlockKind, ContentNode, Diagnostic, DiagnosticCategory, InlineNode,
    Metadata, ParserConfig, Span, TagOccurrence, TagPosition,
};
use regex::Regex;
use tracing::{debug, trace};

use crate::attributes::parse_attributes;
use crate::image::{image_token_spans, remove_image_tokens};
use crate::inline::{InlineScope, inline_run};
use crate::metadata::parse_metadata;
use crate::tags::{
    find_block_tags, find_metadata_tags, find_separators, merge_positions, strip_metadata_tags,
};

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\b[^>]*>?").expect("line break pattern is valid"));

static BREAK_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)size\s*=\s*["']?([^"'>]+)["']?"#).expect("break size pattern is valid")
});

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)\s*%").expect("percent pattern is valid"));

static METADATA_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<CDATA").expect("metadata open pattern is valid"));

/// Markup cut at every `<br>` tag.
///
/// `heights[i]` is the gap contributed by the break that ends `parts[i]`, so
/// there is always one more part than heights.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBreakSplit<'a> {
    pub parts: Vec<&'a str>,
    /// Byte offset of each part in the source.
    pub starts: Vec<usize>,
    pub heights: Vec<f32>,
}

impl LineBreakSplit<'_> {
    /// Gap after part `index`; past the last break the default applies.
    #[must_use]
    pub fn gap_after(&self, index: usize, default_gap: f32) -> f32 {
        self.heights.get(index).copied().unwrap_or(default_gap)
    }
}

#[must_use]
pub fn split_by_line_breaks(text: &str, default_gap: f32) -> LineBreakSplit<'_> {
    let mut split = LineBreakSplit {
        parts: Vec::new(),
        starts: Vec::new(),
        heights: Vec::new(),
    };
    let mut cursor = 0;

    for found in LINE_BREAK_RE.find_iter(text) {
        split.parts.push(&text[cursor..found.start()]);
        split.starts.push(cursor);
        split
            .heights
            .push(line_break_height(found.as_str(), default_gap));
        cursor = found.end();
    }
    split.parts.push(&text[cursor..]);
    split.starts.push(cursor);
    split
}

/// Gap for one `<br>` tag: `size="NN%"` scales the default, anything else
/// keeps it.
#[must_use]
pub fn line_break_height(tag: &str, default_gap: f32) -> f32 {
    let Some(size) = BREAK_SIZE_RE
        .captures(tag)
        .and_then(|captures| captures.get(1))
    else {
        return default_gap;
    };
    PERCENT_RE
        .captures(size.as_str().trim())
        .and_then(|captures| captures.get(1))
        .and_then(|percent| percent.as_str().parse::<f32>().ok())
        .map_or(default_gap, |percent| default_gap * percent / 100.0)
}

/// Assemble one `<br>`-free section of markup into content nodes.
///
/// Metadata tags are stripped before tag discovery and attached to the
/// nearest following button or link.
pub fn assemble_section(
    text: &str,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ContentNode> {
    assemble_at(text, Some(0), config, diagnostics)
}

fn assemble_at(
    text: &str,
    source_base: Option<usize>,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ContentNode> {
    let metadata = find_metadata_tags(text);
    for occurrence in &metadata {
        if !occurrence.payload.trim().is_empty() && parse_metadata(&occurrence.payload).is_absent()
        {
            let mut diagnostic = Diagnostic::warning("metadata payload is neither attributes nor a JSON object")
                .with_category(DiagnosticCategory::Metadata)
                .with_suggestion("use key=\"value\" pairs or a JSON object");
            if let Some(base) = source_base {
                diagnostic = diagnostic.with_span(occurrence.span().shifted(base));
            }
            diagnostics.push(diagnostic);
        }
    }

    let stripped = strip_metadata_tags(text);
    let scope = InlineScope::new(&metadata, &stripped, config.max_inline_depth);
    let mut assembler = Assembler {
        config,
        scope,
        source_base,
        diagnostics,
    };
    assembler.assemble(&stripped.text, 0, 0)
}

struct Assembler<'a, 'd> {
    config: &'a ParserConfig,
    scope: InlineScope<'a>,
    source_base: Option<usize>,
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl Assembler<'_, '_> {
    /// `text` is a slice of the stripped section starting at `offset`.
    fn assemble(&mut self, text: &str, offset: usize, depth: usize) -> Vec<ContentNode> {
        let positions = merge_positions(find_separators(text), find_block_tags(text));
        let mut nodes = Vec::new();
        let mut cursor = 0;

        for position in positions {
            if position.start() < cursor {
                if position.end() > cursor {
                    self.report_overlap(offset + position.start(), offset + position.end());
                } else {
                    trace!(start = position.start(), "position inside consumed block");
                }
                continue;
            }

            self.flush_text(&text[cursor..position.start()], offset + cursor, &mut nodes);
            match &position {
                TagPosition::Separator(_) => nodes.push(ContentNode::Separator),
                TagPosition::Block(block) => {
                    let Some(kind) = block.kind() else {
                        unreachable!("block finder matched `{}`, which has no kind", block.tag_name);
                    };
                    nodes.push(self.block(block, kind, offset, depth));
                }
            }
            cursor = position.end();
        }

        self.flush_text(&text[cursor..], offset + cursor, &mut nodes);
        nodes
    }

    fn flush_text(&mut self, raw: &str, offset: usize, nodes: &mut Vec<ContentNode>) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let trimmed_offset = offset + (raw.len() - raw.trim_start().len());

        let tokens = image_token_spans(trimmed, self.config);
        if !tokens.is_empty() && remove_image_tokens(trimmed).is_empty() {
            nodes.extend(
                tokens
                    .into_iter()
                    .map(|(_, token)| ContentNode::Image(token)),
            );
            return;
        }

        let inline = inline_run(
            trimmed,
            &self.scope.at(trimmed_offset),
            self.config,
            self.diagnostics,
        );
        nodes.push(ContentNode::TextRun {
            text: trimmed.to_string(),
            inline,
        });
    }

    fn block(
        &mut self,
        block: &TagOccurrence,
        kind: BlockKind,
        offset: usize,
        depth: usize,
    ) -> ContentNode {
        let inner_offset = offset + block.inner_start();

        let body = match kind {
            BlockKind::Heading | BlockKind::Typography => BlockBody::Inline {
                nodes: self.inline(&block.inner_content, inner_offset),
            },
            BlockKind::Container if depth >= self.config.max_inline_depth => {
                debug!(depth, "container nesting limit reached");
                self.diagnostics.push(
                    Diagnostic::warning("nested containers beyond the depth limit were kept as inline text")
                        .with_category(DiagnosticCategory::Recovery),
                );
                BlockBody::Inline {
                    nodes: self.inline(&block.inner_content, inner_offset),
                }
            }
            BlockKind::Container => BlockBody::Nested {
                nodes: self.assemble(&block.inner_content, inner_offset, depth + 1),
            },
            BlockKind::Button => BlockBody::Button {
                label: remove_image_tokens(&block.inner_content),
                icon: image_token_spans(&block.inner_content, self.config)
                    .into_iter()
                    .next()
                    .map(|(_, token)| token),
            },
        };

        let metadata = if kind == BlockKind::Button {
            self.scope.metadata_at(offset + block.start)
        } else {
            Metadata::Absent
        };
        trace!(tag = %block.tag_name, kind = kind.as_str(), has_metadata = metadata.is_present(), "block element");

        ContentNode::Block(BlockElement {
            tag_name: block.tag_name.clone(),
            kind,
            attributes: parse_attributes(&block.raw_attributes),
            raw_attributes: block.raw_attributes.clone(),
            inner_content: block.inner_content.clone(),
            metadata,
            body,
        })
    }

    fn inline(&mut self, text: &str, offset: usize) -> Vec<InlineNode> {
        inline_run(text, &self.scope.at(offset), self.config, self.diagnostics)
    }

    fn report_overlap(&mut self, start: usize, end: usize) {
        debug!(start, end, "skipping tag that overlaps a consumed block");
        let mut diagnostic = Diagnostic::warning("tag overlaps an earlier block and was skipped")
            .with_category(DiagnosticCategory::Tag);
        if let Some(base) = self.source_base {
            let span = Span::new(
                self.scope.source_offset(start),
                self.scope.source_offset(end),
            );
            diagnostic = diagnostic.with_span(span.shifted(base));
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Parse a whole markup message: split on `<br>`, carry metadata-only parts
/// forward, assemble each part and emit the gaps between them.
///
/// The trailing gap hint is not emitted as a node.
pub fn parse_markup(
    text: &str,
    config: &ParserConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<ContentNode> {
    let split = split_by_line_breaks(text, config.line_break_gap);
    let part_count = split.parts.len();
    let mut nodes = Vec::new();
    let mut pending = String::new();

    for (index, (&raw, &start)) in split.parts.iter().zip(&split.starts).enumerate() {
        let gap = split.gap_after(index, config.line_break_gap);
        let metadata_only =
            strip_metadata_tags(raw).text.trim().is_empty() && METADATA_OPEN_RE.is_match(raw);

        let (part, source_base) = if metadata_only {
            trace!(index, "carrying metadata-only part forward");
            pending.push_str(raw);
            (String::new(), None)
        } else if pending.is_empty() {
            (raw.to_string(), Some(start))
        } else {
            let mut combined = std::mem::take(&mut pending);
            combined.push_str(raw);
            (combined, None)
        };

        if part.trim().is_empty() {
            if part_count > 1 {
                nodes.push(ContentNode::SpacerGap { height: gap });
            }
            continue;
        }

        let section = assemble_at(&part, source_base, config, diagnostics);
        if section.is_empty() {
            continue;
        }
        nodes.extend(section);
        if index + 1 < part_count {
            nodes.push(ContentNode::SpacerGap { height: gap });
        }
    }

    nodes
}
