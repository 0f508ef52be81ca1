#![forbid(unsafe_code)]

pub mod config;
pub mod glyphs;
pub mod renderer;

use am_core::{ParseResult, RenderContext, walk_result};

pub use config::{GlyphMode, TextRenderConfig};
pub use glyphs::TextGlyphs;
pub use renderer::{ActionKind, InteractionEvent, RenderedAction, RenderedText, TextRenderer};

/// Render a parse result with the default configuration.
#[must_use]
pub fn render_text(result: &ParseResult, context: &RenderContext) -> RenderedText {
    render_text_with_config(result, context, &TextRenderConfig::default())
}

#[must_use]
pub fn render_text_with_config(
    result: &ParseResult,
    context: &RenderContext,
    config: &TextRenderConfig,
) -> RenderedText {
    let mut renderer = TextRenderer::new(config, context);
    walk_result(result, &mut renderer);
    renderer.into_rendered()
}

#[cfg(test)]
mod tests {
    use am_core::RenderContext;
    use am_parser::{MessageParser, parse};
    use proptest::prelude::*;

    use super::{TextRenderConfig, render_text, render_text_with_config};

    #[test]
    fn renders_plain_text_unchanged() {
        let rendered = render_text(&parse("Hello there"), &RenderContext::default());
        assert_eq!(rendered.output, "Hello there\n");
    }

    #[test]
    fn ascii_config_emits_only_ascii() {
        let rendered = render_text_with_config(
            &parse("<h1>Title</h1><hr/><button>[logo_1_1] Go</button>"),
            &RenderContext::default(),
            &TextRenderConfig::ascii(),
        );
        assert!(rendered.output.is_ascii(), "{}", rendered.output);
        assert!(rendered.output.starts_with("Title\n=====\n"));
    }

    #[test]
    fn placeholders_from_context_flow_through_parser() {
        let context = RenderContext::default().with_placeholder("user", "Kim");
        let mut parser = MessageParser::new();
        let result = parser.parse_with_placeholders("Hello [user]", &context.placeholders);
        assert_eq!(render_text(&result, &context).output, "Hello Kim\n");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_render_never_panics(input in "[ -~\n]{0,160}") {
            let result = parse(&input);
            let _ = render_text(&result, &RenderContext::default());
            let _ = render_text_with_config(&result, &RenderContext::default(), &TextRenderConfig::ascii());
        }
    }
}
