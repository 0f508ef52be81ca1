#![forbid(unsafe_code)]

mod attributes;
mod image;
mod inline;
mod markdown;
mod metadata;
mod sections;
mod tags;
mod text;

use std::collections::BTreeMap;

use am_core::{
    BoundedCache, ContentType, DetectionMethod, Diagnostic, DiagnosticCategory, MarkdownLine,
    ParseResult, ParsedContent, ParserConfig, SyncCache,
};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

pub use attributes::{QUOTE_CHARS, clean_quoted_value, color, halign, href, parse_attributes, valign};
pub use image::{
    build_agent_image_url, build_image_url, default_image_size, find_image_tokens,
    image_token_spans, parse_image_token, parse_image_token_with, remove_image_tokens,
};
pub use inline::{
    InlineScope, parse_bold_spans, parse_inline_content, parse_inline_content_with,
    parse_inline_tags,
};
pub use markdown::{
    classify_line, normalize_markdown, parse_markdown_line, parse_markdown_sections,
    parse_markdown_sections_cached,
};
pub use metadata::{metadata_for, nearest_preceding, parse_metadata};
pub use sections::{
    LineBreakSplit, assemble_section, line_break_height, parse_markup, split_by_line_breaks,
};
pub use tags::{
    StrippedText, find_block_candidates, find_block_tags, find_metadata_tags, find_separators,
    merge_positions, resolve_overlaps, strip_metadata_tags,
};
pub use text::{detect_content_type, replace_placeholders, to_non_breaking_spaces};

/// Parse one message with the default constants and no caching.
#[must_use]
pub fn parse(input: &str) -> ParseResult {
    parse_with_config(input, &ParserConfig::default())
}

#[must_use]
pub fn parse_with_config(input: &str, config: &ParserConfig) -> ParseResult {
    let mut line_cache = BoundedCache::new(0);
    parse_uncached(input, config, &mut line_cache)
}

fn parse_uncached(
    input: &str,
    config: &ParserConfig,
    line_cache: &mut BoundedCache<String, MarkdownLine>,
) -> ParseResult {
    let detection = detect_content_type(input);
    debug!(
        content_type = detection.content_type.as_str(),
        method = detection.method.as_str(),
        confidence = detection.confidence,
        "detected content type"
    );

    let mut diagnostics = Vec::new();
    if detection.method == DetectionMethod::EmptyInput {
        diagnostics.push(
            Diagnostic::info("input is empty").with_category(DiagnosticCategory::Detection),
        );
    }

    let (content, trailing_gap) = match detection.content_type {
        ContentType::Markup => (
            ParsedContent::Markup {
                nodes: parse_markup(input, config, &mut diagnostics),
            },
            config.markup_trailing_gap,
        ),
        ContentType::Markdown | ContentType::PlainText => (
            ParsedContent::Markdown {
                sections: parse_markdown_sections_cached(
                    input,
                    line_cache,
                    config.markdown_section_gap,
                ),
            },
            config.markdown_trailing_gap,
        ),
    };

    ParseResult {
        detection,
        content,
        trailing_gap,
        diagnostics,
    }
}

/// Counters kept by a [`MessageParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    /// Parses that ran the full pipeline.
    pub parse_runs: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// A parsing pipeline owning its message and line caches.
///
/// Independent parsers never share eviction pressure.
#[derive(Debug)]
pub struct MessageParser {
    config: ParserConfig,
    message_cache: BoundedCache<String, ParseResult>,
    line_cache: BoundedCache<String, MarkdownLine>,
    stats: ParserStats,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            message_cache: BoundedCache::new(config.message_cache_capacity),
            line_cache: BoundedCache::new(config.line_cache_capacity),
            config,
            stats: ParserStats::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `input`, answering from the message cache when it was seen before.
    pub fn parse(&mut self, input: &str) -> ParseResult {
        let key = input.to_string();
        if let Some(cached) = self.message_cache.get(&key) {
            self.stats.cache_hits += 1;
            debug!(bytes = input.len(), "message cache hit");
            return cached.clone();
        }

        self.stats.cache_misses += 1;
        self.stats.parse_runs += 1;
        debug!(bytes = input.len(), "message cache miss");
        let result = parse_uncached(input, &self.config, &mut self.line_cache);
        self.message_cache.set(key, result.clone());
        result
    }

    /// Substitute `[key]` placeholders, then parse. The cache is keyed by the
    /// substituted text.
    pub fn parse_with_placeholders(
        &mut self,
        input: &str,
        placeholders: &BTreeMap<String, String>,
    ) -> ParseResult {
        let substituted = replace_placeholders(input, placeholders);
        self.parse(&substituted)
    }

    /// Empty both caches and zero the counters.
    pub fn reset(&mut self) {
        self.message_cache.clear();
        self.line_cache.clear();
        self.stats = ParserStats::default();
    }

    #[must_use]
    pub const fn stats(&self) -> ParserStats {
        self.stats
    }

    #[must_use]
    pub fn cached_messages(&self) -> usize {
        self.message_cache.len()
    }

    #[must_use]
    pub fn cached_lines(&self) -> usize {
        self.line_cache.len()
    }
}

/// A message-caching parser that can be shared across threads by reference.
///
/// Lines are not memoized; each miss parses with a call-local line cache.
#[derive(Debug)]
pub struct SharedMessageParser {
    config: ParserConfig,
    message_cache: SyncCache<String, ParseResult>,
}

impl Default for SharedMessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedMessageParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            message_cache: SyncCache::new(config.message_cache_capacity),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `input`, answering from the shared message cache when possible.
    ///
    /// Two threads missing on the same input may both parse it; the second
    /// store overwrites the first with an equal result.
    pub fn parse(&self, input: &str) -> ParseResult {
        let key = input.to_string();
        if let Some(cached) = self.message_cache.get(&key) {
            debug!(bytes = input.len(), "shared message cache hit");
            return cached;
        }

        debug!(bytes = input.len(), "shared message cache miss");
        let mut line_cache = BoundedCache::new(0);
        let result = parse_uncached(input, &self.config, &mut line_cache);
        self.message_cache.set(key, result.clone());
        result
    }

    pub fn parse_with_placeholders(
        &self,
        input: &str,
        placeholders: &BTreeMap<String, String>,
    ) -> ParseResult {
        self.parse(&replace_placeholders(input, placeholders))
    }

    pub fn reset(&self) {
        self.message_cache.clear();
    }

    #[must_use]
    pub fn cached_messages(&self) -> usize {
        self.message_cache.len()
    }
}

/// Compact JSON summary of a parse result.
#[must_use]
pub fn parse_summary_json(parsed: &ParseResult) -> String {
    let counts = parsed.diagnostic_counts();
    json!({
        "content_type": parsed.content_type().as_str(),
        "detection_method": parsed.detection.method.as_str(),
        "confidence": parsed.detection.confidence,
        "node_count": parsed.nodes().len(),
        "section_count": parsed.sections().len(),
        "line_count": parsed.sections().iter().map(|section| section.lines.len()).sum::<usize>(),
        "trailing_gap": parsed.trailing_gap,
        "warning_count": counts.warnings,
        "diagnostic_count": counts.total(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use am_core::{
        BlockBody, ContentNode, ContentType, DiagnosticCategory, MarkdownLineKind, ParserConfig,
    };
    use proptest::prelude::*;

    use super::{MessageParser, ParserStats, SharedMessageParser, parse, parse_summary_json};

    #[test]
    fn markup_input_takes_markup_path() {
        let result = parse(r#"<CDATA q="A"/><button>Go</button>"#);
        assert_eq!(result.content_type(), ContentType::Markup);
        assert_eq!(result.trailing_gap, 20.0);
        assert_eq!(result.nodes().len(), 1);
        let button = result.nodes()[0].as_block().expect("button");
        assert_eq!(button.metadata.get("q").as_deref(), Some("A"));
        assert!(matches!(button.body, BlockBody::Button { .. }));
    }

    #[test]
    fn markdown_input_takes_markdown_path() {
        let result = parse("# Title\nline1\n\n- a\n- b");
        assert_eq!(result.content_type(), ContentType::Markdown);
        assert_eq!(result.trailing_gap, 30.0);
        let sections = result.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines[0].kind, MarkdownLineKind::Heading1);
        assert!(
            sections[1]
                .lines
                .iter()
                .all(|line| line.kind == MarkdownLineKind::BulletItem)
        );
    }

    #[test]
    fn plain_text_is_one_section() {
        let result = parse("Hello there");
        assert_eq!(result.content_type(), ContentType::PlainText);
        assert_eq!(result.sections().len(), 1);
        assert_eq!(result.sections()[0].lines[0].content, "Hello there");
    }

    #[test]
    fn empty_input_reports_detection_info() {
        let result = parse("");
        assert!(result.sections().is_empty());
        assert_eq!(result.diagnostics_by_category(DiagnosticCategory::Detection).len(), 1);
        assert!(!result.has_warnings());
    }

    #[test]
    fn unknown_tag_degrades_to_text() {
        let result = parse("<foo>x</foo>");
        assert!(matches!(&result.nodes()[0], ContentNode::TextRun { text, .. } if text == "<foo>x</foo>"));
    }

    #[test]
    fn cache_returns_equal_result_without_reparsing() {
        let mut parser = MessageParser::new();
        let first = parser.parse("<h1>Hi</h1><br><button>Go</button>");
        let second = parser.parse("<h1>Hi</h1><br><button>Go</button>");
        assert_eq!(first, second);
        assert_eq!(
            parser.stats(),
            ParserStats {
                parse_runs: 1,
                cache_hits: 1,
                cache_misses: 1,
            }
        );
    }

    #[test]
    fn message_cache_evicts_oldest_input() {
        let mut parser = MessageParser::with_config(ParserConfig {
            message_cache_capacity: 2,
            ..ParserConfig::default()
        });
        parser.parse("one");
        parser.parse("two");
        parser.parse("three");
        assert_eq!(parser.cached_messages(), 2);
        parser.parse("one");
        assert_eq!(parser.stats().parse_runs, 4);
        parser.parse("three");
        assert_eq!(parser.stats().parse_runs, 4);
    }

    #[test]
    fn uncached_parser_always_reparses() {
        let mut parser = MessageParser::with_config(ParserConfig::uncached());
        parser.parse("same");
        parser.parse("same");
        assert_eq!(parser.stats().parse_runs, 2);
        assert_eq!(parser.cached_lines(), 0);
    }

    #[test]
    fn line_cache_fills_on_markdown() {
        let mut parser = MessageParser::new();
        parser.parse("# A\n- b\n- c");
        assert_eq!(parser.cached_lines(), 3);
    }

    #[test]
    fn placeholders_apply_before_cache_lookup() {
        let mut parser = MessageParser::new();
        let placeholders: BTreeMap<String, String> =
            [("name".to_string(), "Kim".to_string())].into_iter().collect();
        let substituted = parser.parse_with_placeholders("Hi [name]", &placeholders);
        assert_eq!(substituted.sections()[0].lines[0].content, "Hi Kim");
        parser.parse("Hi Kim");
        assert_eq!(parser.stats().cache_hits, 1);
    }

    #[test]
    fn reset_clears_caches_and_counters() {
        let mut parser = MessageParser::new();
        parser.parse("# A");
        parser.reset();
        assert_eq!(parser.cached_messages(), 0);
        assert_eq!(parser.cached_lines(), 0);
        assert_eq!(parser.stats(), ParserStats::default());
    }

    #[test]
    fn shared_parser_serves_threads_from_one_cache() {
        let parser = SharedMessageParser::with_config(ParserConfig {
            message_cache_capacity: 4,
            ..ParserConfig::default()
        });
        let inputs = ["<button>A</button>", "# B", "plain C"];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for input in inputs {
                        assert_eq!(parser.parse(input), parse(input));
                    }
                });
            }
        });

        assert_eq!(parser.cached_messages(), inputs.len());
        parser.reset();
        assert_eq!(parser.cached_messages(), 0);
    }

    #[test]
    fn shared_parser_applies_placeholders_and_evicts_fifo() {
        let parser = SharedMessageParser::with_config(ParserConfig {
            message_cache_capacity: 1,
            ..ParserConfig::default()
        });
        let placeholders: BTreeMap<String, String> =
            [("who".to_string(), "Kim".to_string())].into_iter().collect();
        let result = parser.parse_with_placeholders("Hi [who]", &placeholders);
        assert_eq!(result.sections()[0].lines[0].content, "Hi Kim");
        parser.parse("other");
        assert_eq!(parser.cached_messages(), 1);
    }

    #[test]
    fn summary_json_reports_counts() {
        let summary = parse_summary_json(&parse("<hr/><b1b>x</b1b>"));
        assert!(summary.contains("\"content_type\":\"markup\""));
        assert!(summary.contains("\"node_count\":2"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parse_is_total_and_deterministic(input in "[ -~\n]{0,160}") {
            prop_assert_eq!(parse(&input), parse(&input));
        }

        #[test]
        fn prop_cached_parse_matches_uncached(input in "[a-z<>/ \n#*\\-0-9.]{0,96}") {
            let mut parser = MessageParser::new();
            let cached_first = parser.parse(&input);
            let cached_second = parser.parse(&input);
            prop_assert_eq!(&cached_first, &cached_second);
            prop_assert_eq!(cached_first, parse(&input));
        }
    }
}
