#![forbid(unsafe_code)]

mod cache;
mod catalog;
mod config;
mod visit;

pub use cache::{BoundedCache, SyncCache};
pub use catalog::{
    BLOCK_TAGS, BUTTON_TAGS, BlockKind, HEADING_TAGS, TYPOGRAPHY_TAGS, is_button_tag, is_div_tag,
    is_heading_tag, is_typography_tag,
};
pub use config::{ConfigError, ConfigParse, ParserConfig, parse_config_value};
pub use visit::{ContentVisitor, InteractionHandler, RenderContext, walk_result};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute name to value, as written in a tag or metadata payload.
pub type AttributeMap = BTreeMap<String, String>;

/// Half-open byte range `[start, end)` into the text a finder scanned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// True when `other` lies entirely inside `self` (equal spans included).
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// True when the spans intersect but neither contains the other.
    #[must_use]
    pub const fn overlaps_partially(self, other: Self) -> bool {
        let starts_inside = other.start >= self.start && other.start < self.end && other.end > self.end;
        let ends_inside = other.end > self.start && other.end <= self.end && other.start < self.start;
        starts_inside || ends_inside
    }

    #[must_use]
    pub const fn shifted(self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }
}

/// Parsed payload of a metadata (CDATA) tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Metadata {
    /// Payload written as `key="value"` pairs.
    Attributes(AttributeMap),
    /// Payload written as a JSON object.
    Object(Map<String, Value>),
    /// Empty, unparsable, or no metadata tag to attach.
    #[default]
    Absent,
}

impl Metadata {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Look up a value by key, rendering JSON scalars as strings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Attributes(attributes) => attributes.get(key).cloned(),
            Self::Object(object) => object.get(key).map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }),
            Self::Absent => None,
        }
    }

    #[must_use]
    pub fn as_attributes(&self) -> Option<&AttributeMap> {
        match self {
            Self::Attributes(attributes) => Some(attributes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// JSON view of the payload; `null` when absent.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Attributes(attributes) => Value::Object(
                attributes
                    .iter()
                    .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                    .collect(),
            ),
            Self::Object(object) => Value::Object(object.clone()),
            Self::Absent => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    #[default]
    Image,
    Logo,
    Img,
}

impl ImageKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Logo => "logo",
            Self::Img => "img",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "image" => Some(Self::Image),
            "logo" => Some(Self::Logo),
            "img" => Some(Self::Img),
            _ => None,
        }
    }
}

/// A bracketed `[kind_id_seq]` or `[kind_id_seq|WxH]` image reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ImageToken {
    pub kind: ImageKind,
    pub resource_id: String,
    pub sequence_id: String,
    pub width: u32,
    pub height: u32,
}

/// A block tag match found by the tag finder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagOccurrence {
    pub start: usize,
    /// Lowercased tag name.
    pub tag_name: String,
    pub raw_attributes: String,
    pub inner_content: String,
    /// Offset of `inner_content` from `start` (the length of the opening tag).
    pub inner_offset: usize,
    pub len: usize,
}

impl TagOccurrence {
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end())
    }

    #[must_use]
    pub const fn inner_start(&self) -> usize {
        self.start + self.inner_offset
    }

    #[must_use]
    pub fn kind(&self) -> Option<BlockKind> {
        BlockKind::of(&self.tag_name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeparatorOccurrence {
    pub start: usize,
    pub len: usize,
}

impl SeparatorOccurrence {
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A self-closing (`<CDATA k="v"/>`) or paired (`<CDATA>{..}</CDATA>`) metadata tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataOccurrence {
    pub start: usize,
    pub end: usize,
    pub payload: String,
}

impl MetadataOccurrence {
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Separator and block occurrences merged into one position-ordered stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagPosition {
    Separator(SeparatorOccurrence),
    Block(TagOccurrence),
}

impl TagPosition {
    #[must_use]
    pub const fn start(&self) -> usize {
        match self {
            Self::Separator(separator) => separator.start,
            Self::Block(block) => block.start,
        }
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        match self {
            Self::Separator(separator) => separator.end(),
            Self::Block(block) => block.end(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkdownLineKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    BulletItem,
    OrderedItem,
    #[default]
    PlainText,
    Blank,
}

impl MarkdownLineKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heading1 => "h1",
            Self::Heading2 => "h2",
            Self::Heading3 => "h3",
            Self::Heading4 => "h4",
            Self::BulletItem => "bullet-list",
            Self::OrderedItem => "ordered-list",
            Self::PlainText => "text",
            Self::Blank => "empty",
        }
    }

    #[must_use]
    pub const fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            Self::Heading4 => Some(4),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    #[must_use]
    pub const fn is_list_item(self) -> bool {
        matches!(self, Self::BulletItem | Self::OrderedItem)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MarkdownLine {
    pub kind: MarkdownLineKind,
    /// Line text with the marker prefix stripped.
    pub content: String,
    /// Numeral of an ordered-list item, as written.
    pub ordered_index: Option<String>,
    pub raw_line: String,
    /// Bold/plain decomposition of `content`.
    pub spans: Vec<InlineSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MarkdownSection {
    pub lines: Vec<MarkdownLine>,
    /// Rendering hint for the gap below the section.
    pub trailing_gap: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum InlineSpanKind {
    #[default]
    Plain,
    Bold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InlineSpan {
    pub kind: InlineSpanKind,
    pub content: String,
}

impl InlineSpan {
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: InlineSpanKind::Plain,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn bold(content: impl Into<String>) -> Self {
        Self {
            kind: InlineSpanKind::Bold,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InlineLink {
    pub href: String,
    /// Metadata of the nearest preceding metadata tag, when the link has an href.
    pub metadata: Metadata,
    pub children: Vec<InlineNode>,
}

/// Inline content of a markup text run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineNode {
    Text { text: String },
    Bold { children: Vec<InlineNode> },
    Link(InlineLink),
    Font {
        attributes: AttributeMap,
        children: Vec<InlineNode>,
    },
    Image(ImageToken),
    LineBreak,
}

impl InlineNode {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Visible text with all markup removed.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Bold { children } | Self::Font { children, .. } => plain_text_of(children),
            Self::Link(link) => plain_text_of(&link.children),
            Self::Image(_) => String::new(),
            Self::LineBreak => "\n".to_string(),
        }
    }
}

/// Concatenated visible text of a node list.
#[must_use]
pub fn plain_text_of(nodes: &[InlineNode]) -> String {
    nodes.iter().map(InlineNode::plain_text).collect()
}

/// What a recognized block tag carries besides its raw inner content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockBody {
    /// Headings and typography tags.
    Inline { nodes: Vec<InlineNode> },
    /// `div`: inner content assembled as its own node sequence.
    Nested { nodes: Vec<ContentNode> },
    /// Button-family tags.
    Button {
        label: String,
        icon: Option<ImageToken>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockElement {
    pub tag_name: String,
    pub kind: BlockKind,
    pub raw_attributes: String,
    pub attributes: AttributeMap,
    pub inner_content: String,
    pub metadata: Metadata,
    pub body: BlockBody,
}

impl BlockElement {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Assembled markup output handed to a rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    TextRun {
        text: String,
        inline: Vec<InlineNode>,
    },
    Block(BlockElement),
    Separator,
    SpacerGap {
        height: f32,
    },
    Image(ImageToken),
}

impl ContentNode {
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }

    #[must_use]
    pub fn as_block(&self) -> Option<&BlockElement> {
        match self {
            Self::Block(block) => Some(block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Markup,
    Markdown,
    #[default]
    PlainText,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "markup",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
        }
    }
}

/// How the content type was decided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// At least one `<...>` tag is present.
    AngleBracketTags,
    /// Markdown markers present and no tags.
    MarkdownMarkers,
    /// Nothing recognizable; treated as plain text.
    #[default]
    Fallback,
    /// Input was empty or whitespace.
    EmptyInput,
}

impl DetectionMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AngleBracketTags => "angle-bracket tags",
            Self::MarkdownMarkers => "markdown markers",
            Self::Fallback => "fallback to plain text",
            Self::EmptyInput => "empty input",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DetectedContent {
    pub content_type: ContentType,
    pub method: DetectionMethod,
    /// Detection confidence (0.0 to 1.0)
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedContent {
    Markdown { sections: Vec<MarkdownSection> },
    Markup { nodes: Vec<ContentNode> },
}

impl Default for ParsedContent {
    fn default() -> Self {
        Self::Markdown {
            sections: Vec::new(),
        }
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Informational hint
    Hint,
    #[default]
    Info,
    /// Something was recovered locally
    Warning,
    Error,
}

impl DiagnosticSeverity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Category of diagnostic for filtering and grouping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DiagnosticCategory {
    Detection,
    Attribute,
    Metadata,
    Image,
    #[default]
    Tag,
    Markdown,
    Inline,
    /// A guard tripped and output was degraded
    Recovery,
}

impl DiagnosticCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detection => "detection",
            Self::Attribute => "attribute",
            Self::Metadata => "metadata",
            Self::Image => "image",
            Self::Tag => "tag",
            Self::Markdown => "markdown",
            Self::Inline => "inline",
            Self::Recovery => "recovery",
        }
    }
}

/// A note about how the parser interpreted or degraded part of the input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub category: DiagnosticCategory,
    pub message: String,
    /// Byte range in the parsed input, when known
    pub span: Option<Span>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    #[must_use]
    pub fn hint(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Hint, message)
    }

    #[must_use]
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }

    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DiagnosticCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

impl DiagnosticCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.errors + self.warnings + self.infos + self.hints
    }
}

/// Output of one parse call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ParseResult {
    pub detection: DetectedContent,
    pub content: ParsedContent,
    /// Rendering hint for the gap after the whole message.
    pub trailing_gap: f32,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.detection.content_type
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_warning)
    }

    #[must_use]
    pub fn diagnostic_counts(&self) -> DiagnosticCounts {
        let mut counts = DiagnosticCounts::default();
        for diagnostic in &self.diagnostics {
            match diagnostic.severity {
                DiagnosticSeverity::Error => counts.errors += 1,
                DiagnosticSeverity::Warning => counts.warnings += 1,
                DiagnosticSeverity::Info => counts.infos += 1,
                DiagnosticSeverity::Hint => counts.hints += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn diagnostics_by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.category == category)
            .collect()
    }

    /// Markup nodes, or an empty slice for markdown results.
    #[must_use]
    pub fn nodes(&self) -> &[ContentNode] {
        match &self.content {
            ParsedContent::Markup { nodes } => nodes,
            ParsedContent::Markdown { .. } => &[],
        }
    }

    /// Markdown sections, or an empty slice for markup results.
    #[must_use]
    pub fn sections(&self) -> &[MarkdownSection] {
        match &self.content {
            ParsedContent::Markdown { sections } => sections,
            ParsedContent::Markup { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        ContentNode, Diagnostic, DiagnosticCategory, DiagnosticSeverity, ImageKind, InlineLink,
        InlineNode, MarkdownLineKind, Metadata, ParseResult, ParsedContent, Span, plain_text_of,
    };

    #[test]
    fn span_containment_and_partial_overlap() {
        let outer = Span::new(0, 20);
        let inner = Span::new(5, 10);
        let straddling = Span::new(15, 25);

        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
        assert!(outer.contains(outer));
        assert!(outer.overlaps_partially(straddling));
        assert!(straddling.overlaps_partially(outer));
        assert!(!outer.overlaps_partially(inner));
        assert!(!outer.overlaps_partially(Span::new(20, 30)));
    }

    #[test]
    fn metadata_lookup_covers_both_payload_shapes() {
        let attributes = Metadata::Attributes([("q".to_string(), "A".to_string())].into());
        assert_eq!(attributes.get("q").as_deref(), Some("A"));

        let Some(object) = json!({"q": "B", "n": 3}).as_object().cloned() else {
            panic!("literal is an object");
        };
        let object = Metadata::Object(object);
        assert_eq!(object.get("q").as_deref(), Some("B"));
        assert_eq!(object.get("n").as_deref(), Some("3"));

        assert!(Metadata::Absent.is_absent());
        assert_eq!(Metadata::Absent.get("q"), None);
        assert_eq!(Metadata::Absent.to_json(), serde_json::Value::Null);
    }

    #[test]
    fn metadata_serializes_with_explicit_kind() {
        let encoded = serde_json::to_value(Metadata::Absent).expect("serialize metadata");
        assert_eq!(encoded, json!({"kind": "absent"}));
    }

    #[test]
    fn image_kind_names_round_trip() {
        for kind in [ImageKind::Image, ImageKind::Logo, ImageKind::Img] {
            assert_eq!(ImageKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ImageKind::from_name("LOGO"), Some(ImageKind::Logo));
        assert_eq!(ImageKind::from_name("icon"), None);
    }

    #[test]
    fn markdown_line_kind_predicates() {
        assert_eq!(MarkdownLineKind::Heading3.heading_level(), Some(3));
        assert!(MarkdownLineKind::OrderedItem.is_list_item());
        assert!(!MarkdownLineKind::PlainText.is_heading());
    }

    #[test]
    fn plain_text_flattens_nested_inline_nodes() {
        let nodes = vec![
            InlineNode::text("see "),
            InlineNode::Link(InlineLink {
                href: "https://example.com".to_string(),
                metadata: Metadata::Absent,
                children: vec![InlineNode::Bold {
                    children: vec![InlineNode::text("here")],
                }],
            }),
            InlineNode::LineBreak,
        ];
        assert_eq!(plain_text_of(&nodes), "see here\n");
    }

    #[test]
    fn parse_result_diagnostic_helpers() {
        let mut result = ParseResult::default();
        assert!(!result.has_warnings());

        result.diagnostics.push(
            Diagnostic::warning("metadata payload is not valid JSON")
                .with_category(DiagnosticCategory::Metadata)
                .with_span(Span::new(0, 10)),
        );
        result
            .diagnostics
            .push(Diagnostic::hint("unknown tag").with_category(DiagnosticCategory::Tag));

        assert!(result.has_warnings());
        let counts = result.diagnostic_counts();
        assert_eq!(counts.warnings, 1);
        assert_eq!(counts.hints, 1);
        assert_eq!(counts.total(), 2);
        assert_eq!(
            result
                .diagnostics_by_category(DiagnosticCategory::Metadata)
                .len(),
            1
        );
        assert_eq!(result.diagnostics[0].severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn content_accessors_match_variant() {
        let markup = ParseResult {
            content: ParsedContent::Markup {
                nodes: vec![ContentNode::Separator],
            },
            ..ParseResult::default()
        };
        assert_eq!(markup.nodes().len(), 1);
        assert!(markup.sections().is_empty());
        assert!(ParseResult::default().nodes().is_empty());
    }
}
