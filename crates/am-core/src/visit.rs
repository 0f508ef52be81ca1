//! Contract between parse results and a rendering collaborator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    BlockBody, BlockElement, ContentNode, ImageToken, InlineNode, MarkdownLine, MarkdownSection,
    Metadata, ParseResult, ParsedContent,
};

/// Inputs a renderer needs besides the parse result itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RenderContext {
    /// Prefix used to build absolute image URLs, ending in `/`.
    pub image_base_url: String,
    /// `[key]` substitutions applied before parsing.
    pub placeholders: BTreeMap<String, String>,
}

impl RenderContext {
    #[must_use]
    pub fn with_image_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.image_base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), value.into());
        self
    }
}

/// Callbacks a host wires to interactive nodes.
pub trait InteractionHandler {
    fn on_button_press(&mut self, title: &str, metadata: &Metadata);

    /// Defaults to opening `href` directly.
    fn on_link_press(&mut self, href: &str, metadata: &Metadata) {
        let _ = metadata;
        self.open_url(href);
    }

    fn open_url(&mut self, url: &str);
}

/// Receives parse output in document order. Every hook is optional.
pub trait ContentVisitor {
    fn enter_section(&mut self, _index: usize, _section: &MarkdownSection) {}

    fn visit_markdown_line(&mut self, _line: &MarkdownLine) {}

    fn leave_section(&mut self, _index: usize, _section: &MarkdownSection) {}

    fn visit_text_run(&mut self, _text: &str, _inline: &[InlineNode], _depth: usize) {}

    /// Called before the children of a nested block are walked.
    fn enter_block(&mut self, _block: &BlockElement, _depth: usize) {}

    fn leave_block(&mut self, _block: &BlockElement, _depth: usize) {}

    fn visit_separator(&mut self, _depth: usize) {}

    fn visit_spacer(&mut self, _height: f32, _depth: usize) {}

    fn visit_image(&mut self, _token: &ImageToken, _depth: usize) {}

    fn finish(&mut self, _trailing_gap: f32) {}
}

/// Drive `visitor` over a parse result.
pub fn walk_result<V: ContentVisitor + ?Sized>(result: &ParseResult, visitor: &mut V) {
    match &result.content {
        ParsedContent::Markdown { sections } => {
            for (index, section) in sections.iter().enumerate() {
                visitor.enter_section(index, section);
                for line in &section.lines {
                    visitor.visit_markdown_line(line);
                }
                visitor.leave_section(index, section);
            }
        }
        ParsedContent::Markup { nodes } => walk_nodes(nodes, 0, visitor),
    }
    visitor.finish(result.trailing_gap);
}

fn walk_nodes<V: ContentVisitor + ?Sized>(nodes: &[ContentNode], depth: usize, visitor: &mut V) {
    for node in nodes {
        match node {
            ContentNode::TextRun { text, inline } => visitor.visit_text_run(text, inline, depth),
            ContentNode::Block(block) => {
                visitor.enter_block(block, depth);
                if let BlockBody::Nested { nodes: children } = &block.body {
                    walk_nodes(children, depth + 1, visitor);
                }
                visitor.leave_block(block, depth);
            }
            ContentNode::Separator => visitor.visit_separator(depth),
            ContentNode::SpacerGap { height } => visitor.visit_spacer(*height, depth),
            ContentNode::Image(token) => visitor.visit_image(token, depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentVisitor, InteractionHandler, RenderContext, walk_result};
    use crate::{
        BlockBody, BlockElement, BlockKind, ContentNode, DetectedContent, ImageKind, ImageToken,
        MarkdownLine, MarkdownSection, Metadata, ParseResult, ParsedContent,
    };

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
    }

    impl ContentVisitor for Trace {
        fn enter_section(&mut self, index: usize, _section: &MarkdownSection) {
            self.events.push(format!("section {index}"));
        }

        fn visit_markdown_line(&mut self, line: &MarkdownLine) {
            self.events.push(format!("line {}", line.content));
        }

        fn visit_text_run(&mut self, text: &str, _inline: &[crate::InlineNode], depth: usize) {
            self.events.push(format!("text@{depth} {text}"));
        }

        fn enter_block(&mut self, block: &BlockElement, depth: usize) {
            self.events.push(format!("enter@{depth} {}", block.tag_name));
        }

        fn leave_block(&mut self, block: &BlockElement, depth: usize) {
            self.events.push(format!("leave@{depth} {}", block.tag_name));
        }

        fn visit_separator(&mut self, depth: usize) {
            self.events.push(format!("hr@{depth}"));
        }

        fn visit_image(&mut self, token: &ImageToken, depth: usize) {
            self.events
                .push(format!("image@{depth} {}", token.resource_id));
        }

        fn finish(&mut self, trailing_gap: f32) {
            self.events.push(format!("finish {trailing_gap}"));
        }
    }

    fn block(tag_name: &str, kind: BlockKind, body: BlockBody) -> BlockElement {
        BlockElement {
            tag_name: tag_name.to_string(),
            kind,
            raw_attributes: String::new(),
            attributes: Default::default(),
            inner_content: String::new(),
            metadata: Metadata::Absent,
            body,
        }
    }

    #[test]
    fn walks_nested_blocks_depth_first() {
        let button = block(
            "button",
            BlockKind::Button,
            BlockBody::Button {
                label: "Go".to_string(),
                icon: None,
            },
        );
        let div = block(
            "div",
            BlockKind::Container,
            BlockBody::Nested {
                nodes: vec![
                    ContentNode::TextRun {
                        text: "inside".to_string(),
                        inline: Vec::new(),
                    },
                    ContentNode::Block(button),
                ],
            },
        );
        let result = ParseResult {
            detection: DetectedContent::default(),
            content: ParsedContent::Markup {
                nodes: vec![
                    ContentNode::Block(div),
                    ContentNode::Separator,
                    ContentNode::Image(ImageToken {
                        kind: ImageKind::Logo,
                        resource_id: "9".to_string(),
                        sequence_id: "1".to_string(),
                        width: 30,
                        height: 30,
                    }),
                ],
            },
            trailing_gap: 20.0,
            diagnostics: Vec::new(),
        };

        let mut trace = Trace::default();
        walk_result(&result, &mut trace);

        assert_eq!(
            trace.events,
            [
                "enter@0 div",
                "text@1 inside",
                "enter@1 button",
                "leave@1 button",
                "leave@0 div",
                "hr@0",
                "image@0 9",
                "finish 20",
            ]
        );
    }

    #[test]
    fn walks_markdown_sections_in_order() {
        let line = |content: &str| MarkdownLine {
            content: content.to_string(),
            ..MarkdownLine::default()
        };
        let result = ParseResult {
            content: ParsedContent::Markdown {
                sections: vec![
                    MarkdownSection {
                        lines: vec![line("a")],
                        trailing_gap: 10.0,
                    },
                    MarkdownSection {
                        lines: vec![line("b"), line("c")],
                        trailing_gap: 10.0,
                    },
                ],
            },
            trailing_gap: 30.0,
            ..ParseResult::default()
        };

        let mut trace = Trace::default();
        walk_result(&result, &mut trace);
        assert_eq!(
            trace.events,
            ["section 0", "line a", "section 1", "line b", "line c", "finish 30"]
        );
    }

    #[derive(Default)]
    struct Opened(Vec<String>);

    impl InteractionHandler for Opened {
        fn on_button_press(&mut self, title: &str, _metadata: &Metadata) {
            self.0.push(format!("button {title}"));
        }

        fn open_url(&mut self, url: &str) {
            self.0.push(format!("open {url}"));
        }
    }

    #[test]
    fn link_press_defaults_to_open_url() {
        let mut handler = Opened::default();
        handler.on_button_press("Buy", &Metadata::Absent);
        handler.on_link_press("https://example.com", &Metadata::Absent);
        assert_eq!(handler.0, ["button Buy", "open https://example.com"]);
    }

    #[test]
    fn render_context_builders() {
        let context = RenderContext::default()
            .with_image_base_url("https://cdn.example/")
            .with_placeholder("name", "Ada");
        assert_eq!(context.image_base_url, "https://cdn.example/");
        assert_eq!(context.placeholders.get("name").map(String::as_str), Some("Ada"));
    }
}
