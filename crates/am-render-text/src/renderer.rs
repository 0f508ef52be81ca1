//! Core text renderer.

use am_core::{
    BlockBody, BlockElement, BlockKind, ContentVisitor, ImageToken, InlineNode, InlineSpanKind,
    InteractionHandler, MarkdownLine, MarkdownLineKind, MarkdownSection, Metadata, RenderContext,
    plain_text_of,
};
use am_parser::{build_image_url, to_non_breaking_spaces};
use serde::Serialize;

use crate::config::TextRenderConfig;
use crate::glyphs::TextGlyphs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Button,
    Link,
}

/// A pressable element found while rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAction {
    pub kind: ActionKind,
    pub label: String,
    /// Link target; buttons have none.
    pub href: Option<String>,
    pub metadata: Metadata,
}

/// Result of text rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedText {
    /// Rendered string output.
    pub output: String,
    /// Buttons and links in document order.
    pub actions: Vec<RenderedAction>,
}

/// An interaction dispatched through [`TextRenderer::press`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    ButtonPressed { title: String, metadata: Metadata },
    UrlOpened { url: String },
}

/// Renders parse results as plain terminal text.
///
/// Drive it with [`am_core::walk_result`]; every button and link becomes a
/// numbered action that [`TextRenderer::press`] can trigger.
#[derive(Debug)]
pub struct TextRenderer<'a> {
    config: &'a TextRenderConfig,
    glyphs: TextGlyphs,
    context: &'a RenderContext,
    lines: Vec<String>,
    actions: Vec<RenderedAction>,
    events: Vec<InteractionEvent>,
}

impl<'a> TextRenderer<'a> {
    #[must_use]
    pub fn new(config: &'a TextRenderConfig, context: &'a RenderContext) -> Self {
        Self {
            glyphs: TextGlyphs::for_mode(config.glyph_mode),
            config,
            context,
            lines: Vec::new(),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[RenderedAction] {
        &self.actions
    }

    #[must_use]
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    /// Press action `index` (zero-based). `false` when there is no such action.
    pub fn press(&mut self, index: usize) -> bool {
        let Some(action) = self.actions.get(index).cloned() else {
            return false;
        };
        match (action.kind, action.href) {
            (ActionKind::Button, _) => self.on_button_press(&action.label, &action.metadata),
            (ActionKind::Link, Some(href)) => self.on_link_press(&href, &action.metadata),
            (ActionKind::Link, None) => return false,
        }
        true
    }

    /// Finish rendering and collect the output.
    #[must_use]
    pub fn into_rendered(mut self) -> RenderedText {
        while self.lines.last().is_some_and(|line| line.trim().is_empty()) {
            self.lines.pop();
        }

        if self.config.show_actions && !self.actions.is_empty() {
            self.lines.push(String::new());
            self.lines.push("Actions:".to_string());
            for (index, action) in self.actions.iter().enumerate() {
                let mut line = format!("  [{}] {}", index + 1, action.label);
                if let Some(href) = &action.href {
                    line.push_str(&format!(" {} {href}", self.glyphs.link_arrow));
                }
                if action.metadata.is_present() {
                    line.push_str(&format!(" {}", action.metadata.to_json()));
                }
                self.lines.push(line);
            }
        }

        let mut output = self.lines.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        RenderedText {
            output,
            actions: self.actions,
        }
    }

    fn prefix(&self, depth: usize) -> String {
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push(self.glyphs.container_edge);
            prefix.push_str(&" ".repeat(self.config.indent.saturating_sub(1)));
        }
        prefix
    }

    fn push_lines(&mut self, text: &str, depth: usize) {
        let prefix = self.prefix(depth);
        for line in text.split('\n') {
            self.lines.push(format!("{prefix}{line}").trim_end().to_string());
        }
    }

    fn push_blank(&mut self, count: usize) {
        for _ in 0..count {
            self.lines.push(String::new());
        }
    }

    fn push_heading(&mut self, level: u8, title: &str, depth: usize) {
        let underline = self.glyphs.underline(level, title);
        self.push_lines(title, depth);
        self.push_lines(&underline, depth);
    }

    fn image_text(&self, token: &ImageToken) -> String {
        let target = if self.context.image_base_url.is_empty() {
            format!("{}_{}_{}", token.kind.as_str(), token.resource_id, token.sequence_id)
        } else {
            build_image_url(
                &self.context.image_base_url,
                &token.resource_id,
                &token.sequence_id,
            )
        };
        format!("[{} {target} {}x{}]", self.glyphs.image, token.width, token.height)
    }

    fn render_inline(&mut self, nodes: &[InlineNode]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                InlineNode::Text { text } => out.push_str(text),
                InlineNode::Bold { children } => {
                    let inner = self.render_inline(children);
                    out.push_str(self.glyphs.bold);
                    out.push_str(&inner);
                    out.push_str(self.glyphs.bold);
                }
                InlineNode::Font { children, .. } => {
                    let inner = self.render_inline(children);
                    out.push_str(&inner);
                }
                InlineNode::Link(link) => {
                    let label = self.render_inline(&link.children);
                    self.actions.push(RenderedAction {
                        kind: ActionKind::Link,
                        label: plain_text_of(&link.children),
                        href: Some(link.href.clone()),
                        metadata: link.metadata.clone(),
                    });
                    out.push_str(&format!("{label} [{}]", self.actions.len()));
                }
                InlineNode::Image(token) => out.push_str(&self.image_text(token)),
                InlineNode::LineBreak => out.push('\n'),
            }
        }
        out
    }

    fn render_markdown_spans(&self, line: &MarkdownLine) -> String {
        line.spans
            .iter()
            .map(|span| match span.kind {
                InlineSpanKind::Plain => span.content.clone(),
                InlineSpanKind::Bold => {
                    format!("{bold}{}{bold}", span.content, bold = self.glyphs.bold)
                }
            })
            .collect()
    }

    fn render_button(
        &mut self,
        block: &BlockElement,
        label: &str,
        icon: Option<&ImageToken>,
        depth: usize,
    ) {
        let shown = if self.config.non_breaking_labels {
            to_non_breaking_spaces(label)
        } else {
            label.to_string()
        };
        let icon = icon
            .map(|token| format!("{} ", self.image_text(token)))
            .unwrap_or_default();
        self.actions.push(RenderedAction {
            kind: ActionKind::Button,
            label: label.to_string(),
            href: None,
            metadata: block.metadata.clone(),
        });
        let text = format!(
            "{}{icon}{shown}{} [{}]",
            self.glyphs.button_open,
            self.glyphs.button_close,
            self.actions.len()
        );
        self.push_lines(&text, depth);
    }
}

impl ContentVisitor for TextRenderer<'_> {
    fn visit_markdown_line(&mut self, line: &MarkdownLine) {
        let text = self.render_markdown_spans(line);
        match line.kind {
            MarkdownLineKind::Heading1 | MarkdownLineKind::Heading2 => {
                let level = line.kind.heading_level().unwrap_or(1);
                self.push_heading(level, &text, 0);
            }
            MarkdownLineKind::Heading3 | MarkdownLineKind::Heading4 => self.push_lines(&text, 0),
            MarkdownLineKind::BulletItem => {
                let bullet = self.glyphs.bullet;
                self.push_lines(&format!("{bullet} {text}"), 0);
            }
            MarkdownLineKind::OrderedItem => {
                let index = line.ordered_index.as_deref().unwrap_or("1");
                self.push_lines(&format!("{index}. {text}"), 0);
            }
            MarkdownLineKind::PlainText => self.push_lines(&text, 0),
            MarkdownLineKind::Blank => self.push_blank(1),
        }
    }

    fn leave_section(&mut self, _index: usize, section: &MarkdownSection) {
        let blank = self.config.gap_lines(section.trailing_gap);
        self.push_blank(blank);
    }

    fn visit_text_run(&mut self, _text: &str, inline: &[InlineNode], depth: usize) {
        let rendered = self.render_inline(inline);
        self.push_lines(&rendered, depth);
    }

    fn enter_block(&mut self, block: &BlockElement, depth: usize) {
        match (&block.body, block.kind) {
            (BlockBody::Inline { nodes }, BlockKind::Heading) => {
                let level = block
                    .tag_name
                    .trim_start_matches('h')
                    .parse::<u8>()
                    .unwrap_or(1);
                let title = self.render_inline(nodes);
                self.push_heading(level, &title, depth);
            }
            (BlockBody::Inline { nodes }, _) => {
                let text = self.render_inline(nodes);
                self.push_lines(&text, depth);
            }
            (BlockBody::Button { label, icon }, _) => {
                self.render_button(block, label, icon.as_ref(), depth);
            }
            (BlockBody::Nested { .. }, _) => {}
        }
    }

    fn visit_separator(&mut self, depth: usize) {
        let width = self
            .config
            .width
            .saturating_sub(depth * self.config.indent)
            .max(1);
        let rule = self.glyphs.rule_line(width);
        self.push_lines(&rule, depth);
    }

    fn visit_spacer(&mut self, height: f32, _depth: usize) {
        let blank = self.config.gap_lines(height);
        self.push_blank(blank);
    }

    fn visit_image(&mut self, token: &ImageToken, depth: usize) {
        let text = self.image_text(token);
        self.push_lines(&text, depth);
    }
}

impl InteractionHandler for TextRenderer<'_> {
    fn on_button_press(&mut self, title: &str, metadata: &Metadata) {
        self.events.push(InteractionEvent::ButtonPressed {
            title: title.to_string(),
            metadata: metadata.clone(),
        });
    }

    fn open_url(&mut self, url: &str) {
        self.events.push(InteractionEvent::UrlOpened {
            url: url.to_string(),
        });
    }
}
